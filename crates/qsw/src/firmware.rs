use serde::{Deserialize, Serialize};

use crate::{firmware_string, lenient, non_empty};

/// `result` payload of the `firmware/update/check` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FirmwareCheckResult {
    /// Build number.
    #[serde(rename = "buildNumber", default, deserialize_with = "lenient::string")]
    pub build_number: Option<String>,
    /// Release date.
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: Option<String>,
    /// Release notes.
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: Option<String>,
    /// Firmware download URLs.
    #[serde(rename = "downloadURL", default, deserialize_with = "lenient::strings")]
    pub download_urls: Option<Vec<String>>,
    /// Whether the offered firmware is newer than the installed one.
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub newer: Option<bool>,
    /// Release number.
    #[serde(default, deserialize_with = "lenient::string")]
    pub number: Option<String>,
    /// Release version.
    #[serde(default, deserialize_with = "lenient::string")]
    pub version: Option<String>,
}

/// The latest firmware offered for a switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirmwareCheck {
    build_number: Option<String>,
    date: Option<String>,
    description: Option<String>,
    download_urls: Vec<String>,
    newer: Option<bool>,
    number: Option<String>,
    version: Option<String>,
}

impl FirmwareCheck {
    /// Creates a [`FirmwareCheck`] from an endpoint result.
    #[must_use]
    pub fn new(result: FirmwareCheckResult) -> Self {
        let mut firmware_check = Self::default();
        firmware_check.update(result);
        firmware_check
    }

    /// Refreshes the values present in the endpoint result.
    pub fn update(&mut self, result: FirmwareCheckResult) {
        if result.build_number.is_some() {
            self.build_number = result.build_number;
        }
        if result.date.is_some() {
            self.date = result.date;
        }
        if result.description.is_some() {
            self.description = result.description;
        }
        if let Some(download_urls) = result.download_urls {
            self.download_urls = download_urls;
        }
        if result.newer.is_some() {
            self.newer = result.newer;
        }
        if result.number.is_some() {
            self.number = result.number;
        }
        if result.version.is_some() {
            self.version = result.version;
        }
    }

    /// Returns the build number.
    #[must_use]
    pub fn build_number(&self) -> Option<&str> {
        self.build_number.as_deref()
    }

    /// Returns the release date.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// Returns the release notes, if not empty.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        non_empty(self.description.as_ref())
    }

    /// Returns the download URLs, if any.
    #[must_use]
    pub fn download_urls(&self) -> Option<&[String]> {
        (!self.download_urls.is_empty()).then_some(self.download_urls.as_slice())
    }

    /// Returns the complete firmware version.
    #[must_use]
    pub fn firmware(&self) -> Option<String> {
        firmware_string(self.version(), self.number(), self.build_number())
    }

    /// Whether the offered firmware is newer than the installed one.
    #[must_use]
    pub const fn newer(&self) -> Option<bool> {
        self.newer
    }

    /// Returns the release number.
    #[must_use]
    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    /// Returns the release version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> FirmwareCheckData {
        FirmwareCheckData {
            build_number: self.build_number.clone(),
            date: self.date.clone(),
            description: self.description().map(str::to_owned),
            download_urls: self.download_urls().map(<[String]>::to_vec),
            firmware: self.firmware(),
            newer: self.newer,
            number: self.number.clone(),
            version: self.version.clone(),
        }
    }
}

/// A serializable snapshot of a [`FirmwareCheck`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FirmwareCheckData {
    /// Build number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
    /// Release date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Release notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Firmware download URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_urls: Option<Vec<String>>,
    /// Complete firmware version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    /// Whether the offered firmware is newer than the installed one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newer: Option<bool>,
    /// Release number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Release version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl FirmwareCheckData {
    /// Whether the snapshot has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `result` payload of the `firmware/condition` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FirmwareConditionResult {
    /// Whether the firmware reports an anomaly.
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub anomaly: Option<bool>,
    /// Anomaly message.
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: Option<String>,
}

/// The health condition of the installed firmware.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirmwareCondition {
    anomaly: Option<bool>,
    message: Option<String>,
}

impl FirmwareCondition {
    /// Creates a [`FirmwareCondition`] from an endpoint result.
    #[must_use]
    pub fn new(result: FirmwareConditionResult) -> Self {
        let mut firmware_condition = Self::default();
        firmware_condition.update(result);
        firmware_condition
    }

    /// Refreshes the values present in the endpoint result.
    pub fn update(&mut self, result: FirmwareConditionResult) {
        if result.anomaly.is_some() {
            self.anomaly = result.anomaly;
        }
        if result.message.is_some() {
            self.message = result.message;
        }
    }

    /// Whether the firmware reports an anomaly.
    #[must_use]
    pub const fn anomaly(&self) -> Option<bool> {
        self.anomaly
    }

    /// Returns the anomaly message, if not empty.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        non_empty(self.message.as_ref())
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> FirmwareConditionData {
        FirmwareConditionData {
            anomaly: self.anomaly,
            message: self.message().map(str::to_owned),
        }
    }
}

/// A serializable snapshot of a [`FirmwareCondition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FirmwareConditionData {
    /// Whether the firmware reports an anomaly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<bool>,
    /// Anomaly message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FirmwareConditionData {
    /// Whether the snapshot has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `result` payload of the `firmware/info` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FirmwareInfoResult {
    /// Build number.
    #[serde(rename = "buildNumber", default, deserialize_with = "lenient::string")]
    pub build_number: Option<String>,
    /// Continuous integration branch.
    #[serde(default, deserialize_with = "lenient::string")]
    pub ci_branch: Option<String>,
    /// Continuous integration commit.
    #[serde(default, deserialize_with = "lenient::string")]
    pub ci_commit: Option<String>,
    /// Continuous integration pipeline.
    #[serde(default, deserialize_with = "lenient::string")]
    pub ci_pipeline: Option<String>,
    /// Commit of the switch SDK.
    #[serde(default, deserialize_with = "lenient::string")]
    pub commit_cpss: Option<String>,
    /// Commit of the switching software.
    #[serde(default, deserialize_with = "lenient::string")]
    pub commit_iss: Option<String>,
    /// Build date.
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: Option<String>,
    /// Release number.
    #[serde(default, deserialize_with = "lenient::string")]
    pub number: Option<String>,
    /// Publication date.
    #[serde(rename = "pubDate", default, deserialize_with = "lenient::string")]
    pub pub_date: Option<String>,
    /// Release version.
    #[serde(default, deserialize_with = "lenient::string")]
    pub version: Option<String>,
}

/// The firmware installed on a switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirmwareInfo {
    build_number: Option<String>,
    ci_branch: Option<String>,
    ci_commit: Option<String>,
    ci_pipeline: Option<String>,
    commit_cpss: Option<String>,
    commit_iss: Option<String>,
    date: Option<String>,
    number: Option<String>,
    pub_date: Option<String>,
    version: Option<String>,
}

impl FirmwareInfo {
    /// Creates a [`FirmwareInfo`] from an endpoint result.
    #[must_use]
    pub fn new(result: FirmwareInfoResult) -> Self {
        let mut firmware_info = Self::default();
        firmware_info.update(result);
        firmware_info
    }

    /// Refreshes the values present in the endpoint result.
    pub fn update(&mut self, result: FirmwareInfoResult) {
        let FirmwareInfoResult {
            build_number,
            ci_branch,
            ci_commit,
            ci_pipeline,
            commit_cpss,
            commit_iss,
            date,
            number,
            pub_date,
            version,
        } = result;

        for (field, value) in [
            (&mut self.build_number, build_number),
            (&mut self.ci_branch, ci_branch),
            (&mut self.ci_commit, ci_commit),
            (&mut self.ci_pipeline, ci_pipeline),
            (&mut self.commit_cpss, commit_cpss),
            (&mut self.commit_iss, commit_iss),
            (&mut self.date, date),
            (&mut self.number, number),
            (&mut self.pub_date, pub_date),
            (&mut self.version, version),
        ] {
            if value.is_some() {
                *field = value;
            }
        }
    }

    /// Returns the build number.
    #[must_use]
    pub fn build_number(&self) -> Option<&str> {
        self.build_number.as_deref()
    }

    /// Returns the continuous integration branch.
    #[must_use]
    pub fn ci_branch(&self) -> Option<&str> {
        self.ci_branch.as_deref()
    }

    /// Returns the continuous integration commit.
    #[must_use]
    pub fn ci_commit(&self) -> Option<&str> {
        self.ci_commit.as_deref()
    }

    /// Returns the continuous integration pipeline.
    #[must_use]
    pub fn ci_pipeline(&self) -> Option<&str> {
        self.ci_pipeline.as_deref()
    }

    /// Returns the commit of the switch SDK, if not empty.
    #[must_use]
    pub fn commit_cpss(&self) -> Option<&str> {
        non_empty(self.commit_cpss.as_ref())
    }

    /// Returns the commit of the switching software.
    #[must_use]
    pub fn commit_iss(&self) -> Option<&str> {
        self.commit_iss.as_deref()
    }

    /// Returns the build date.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// Returns the complete firmware version.
    #[must_use]
    pub fn firmware(&self) -> Option<String> {
        firmware_string(self.version(), self.number(), self.build_number())
    }

    /// Returns the release number.
    #[must_use]
    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    /// Returns the publication date.
    #[must_use]
    pub fn pub_date(&self) -> Option<&str> {
        self.pub_date.as_deref()
    }

    /// Returns the release version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> FirmwareInfoData {
        FirmwareInfoData {
            build_number: self.build_number.clone(),
            ci_branch: self.ci_branch.clone(),
            ci_commit: self.ci_commit.clone(),
            ci_pipeline: self.ci_pipeline.clone(),
            commit_cpss: self.commit_cpss().map(str::to_owned),
            commit_iss: self.commit_iss.clone(),
            date: self.date.clone(),
            firmware: self.firmware(),
            number: self.number.clone(),
            pub_date: self.pub_date.clone(),
            version: self.version.clone(),
        }
    }
}

/// A serializable snapshot of a [`FirmwareInfo`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FirmwareInfoData {
    /// Build number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
    /// Continuous integration branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_branch: Option<String>,
    /// Continuous integration commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_commit: Option<String>,
    /// Continuous integration pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_pipeline: Option<String>,
    /// Commit of the switch SDK.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_cpss: Option<String>,
    /// Commit of the switching software.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_iss: Option<String>,
    /// Build date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Complete firmware version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    /// Release number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Publication date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    /// Release version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl FirmwareInfoData {
    /// Whether the snapshot has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `result` payload of the `firmware/update` endpoint while a firmware
/// is being downloaded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FirmwareUpdateResult {
    /// Downloaded bytes.
    #[serde(rename = "downloadSize", default, deserialize_with = "lenient::integer")]
    pub download_size: Option<i64>,
    /// Firmware size in bytes.
    #[serde(rename = "firmwareSize", default, deserialize_with = "lenient::integer")]
    pub firmware_size: Option<i64>,
}

impl FirmwareUpdateResult {
    /// Returns the download progress as a percentage.
    ///
    /// Returns `None` when any size is missing or the firmware size is not
    /// positive.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        let download_size = self.download_size?;
        let firmware_size = self.firmware_size.filter(|size| *size > 0)?;
        Some(download_size as f64 * 100. / firmware_size as f64)
    }
}

/// The value of `progress` once a firmware update has completed.
pub const UPDATE_DONE: &str = "done";

/// `result` payload of the `firmware/status` endpoint while an update is
/// running.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FirmwareStatusResult {
    /// Update step.
    #[serde(default, deserialize_with = "lenient::string")]
    pub progress: Option<String>,
}

impl FirmwareStatusResult {
    /// Whether the update has completed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.progress.as_deref() == Some(UPDATE_DONE)
    }
}
