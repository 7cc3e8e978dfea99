//! Video Sink Configuration
//!
//! Provides configuration options for a [`VideoSink`](crate::VideoSink) with a
//! builder pattern for ergonomic construction.
//!
//! # Examples
//!
//! ```rust
//! use yuvsink_present::{ChannelLayout, SinkConfig};
//!
//! // Using builder pattern
//! let config = SinkConfig::builder()
//!     .framerate(25.0)
//!     .size(720, 576)
//!     .destination(1024, 768)
//!     .layout(ChannelLayout::Biplanar2)
//!     .build();
//!
//! // Using struct literal with defaults
//! let config = SinkConfig {
//!     framerate: 60.0,
//!     ..Default::default()
//! };
//! ```

use yuvsink_frame::{ChannelLayout, FrameGeometry};

/// Configuration for a video sink
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Target presentation rate in frames per second (default: 30)
    ///
    /// Zero or negative presents as fast as frames are produced.
    pub framerate: f64,

    /// Source width in samples (default: 640)
    pub width: u32,

    /// Source height in scanlines (default: 480)
    pub height: u32,

    /// Presentation width (default: None, same as source)
    pub dst_width: Option<u32>,

    /// Presentation height (default: None, same as source)
    pub dst_height: Option<u32>,

    /// Fixed input layout (default: None)
    ///
    /// When unset, the layout follows the channel count of the first
    /// [`VideoSink::work`](crate::VideoSink::work) call.
    pub layout: Option<ChannelLayout>,

    /// Title passed to the presentation surface (default: "yuvsink")
    pub title: String,

    /// Name of the presentation thread (default: "yuvsink-present")
    pub thread_name: String,

    /// How long dropping the sink waits for the presentation thread
    /// before detaching it, in milliseconds (default: 500)
    pub shutdown_timeout_ms: u64,

    /// Consecutive frame upload failures that stop presentation
    /// (default: 0, never stop)
    pub update_failure_limit: u32,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            framerate: 30.0,
            width: 640,
            height: 480,
            dst_width: None,
            dst_height: None,
            layout: None,
            title: "yuvsink".to_string(),
            thread_name: "yuvsink-present".to_string(),
            shutdown_timeout_ms: 500,
            update_failure_limit: 0,
        }
    }
}

impl SinkConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> SinkConfigBuilder {
        SinkConfigBuilder::default()
    }

    /// Create a configuration from raw construction parameters
    ///
    /// Negative sizes are treated as unset; a negative destination falls back
    /// to the source size and a negative source fails validation.
    #[must_use]
    pub fn from_parameters(framerate: f64, width: i32, height: i32, dst_width: i32, dst_height: i32) -> Self {
        Self {
            framerate,
            width: u32::try_from(width).unwrap_or(0),
            height: u32::try_from(height).unwrap_or(0),
            dst_width: u32::try_from(dst_width).ok(),
            dst_height: u32::try_from(dst_height).ok(),
            ..Default::default()
        }
    }

    /// Validate configuration and return any issues
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();

        if self.framerate.is_nan() {
            issues.push("framerate must be a number".to_string());
        }

        if self.width == 0 {
            issues.push("width must be at least 1".to_string());
        }

        if self.height == 0 {
            issues.push("height must be at least 1".to_string());
        }

        if self.dst_width == Some(0) || self.dst_height == Some(0) {
            issues.push("destination size must be at least 1x1".to_string());
        }

        if self.thread_name.is_empty() {
            issues.push("thread_name cannot be empty".to_string());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Resolve source and presentation geometry
    pub fn geometry(&self) -> yuvsink_frame::Result<FrameGeometry> {
        FrameGeometry::new(self.width, self.height)?.with_destination(self.dst_width, self.dst_height)
    }
}

/// Builder for [`SinkConfig`]
#[derive(Debug, Clone, Default)]
pub struct SinkConfigBuilder {
    framerate: Option<f64>,
    width: Option<u32>,
    height: Option<u32>,
    dst_width: Option<u32>,
    dst_height: Option<u32>,
    layout: Option<ChannelLayout>,
    title: Option<String>,
    thread_name: Option<String>,
    shutdown_timeout_ms: Option<u64>,
    update_failure_limit: Option<u32>,
}

impl SinkConfigBuilder {
    /// Set the target frame rate
    #[must_use]
    pub fn framerate(mut self, fps: f64) -> Self {
        self.framerate = Some(fps);
        self
    }

    /// Set the source size
    #[must_use]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the presentation size
    #[must_use]
    pub fn destination(mut self, width: u32, height: u32) -> Self {
        self.dst_width = Some(width);
        self.dst_height = Some(height);
        self
    }

    /// Fix the input layout
    #[must_use]
    pub fn layout(mut self, layout: ChannelLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Set the surface title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the presentation thread name
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    /// Set the shutdown wait in milliseconds
    #[must_use]
    pub fn shutdown_timeout_ms(mut self, timeout: u64) -> Self {
        self.shutdown_timeout_ms = Some(timeout);
        self
    }

    /// Stop presenting after this many back-to-back upload failures
    #[must_use]
    pub fn update_failure_limit(mut self, limit: u32) -> Self {
        self.update_failure_limit = Some(limit);
        self
    }

    /// Build the configuration
    ///
    /// Returns a [`SinkConfig`] with builder values overriding defaults.
    #[must_use]
    pub fn build(self) -> SinkConfig {
        let defaults = SinkConfig::default();

        SinkConfig {
            framerate: self.framerate.unwrap_or(defaults.framerate),
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            dst_width: self.dst_width.or(defaults.dst_width),
            dst_height: self.dst_height.or(defaults.dst_height),
            layout: self.layout.or(defaults.layout),
            title: self.title.unwrap_or(defaults.title),
            thread_name: self.thread_name.unwrap_or(defaults.thread_name),
            shutdown_timeout_ms: self.shutdown_timeout_ms.unwrap_or(defaults.shutdown_timeout_ms),
            update_failure_limit: self
                .update_failure_limit
                .unwrap_or(defaults.update_failure_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SinkConfig::default();

        assert_eq!(config.framerate, 30.0);
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.layout, None);
        assert_eq!(config.thread_name, "yuvsink-present");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SinkConfig::builder()
            .framerate(0.0)
            .size(320, 240)
            .destination(640, 480)
            .layout(ChannelLayout::Mono1)
            .title("scope")
            .update_failure_limit(5)
            .build();

        assert_eq!(config.framerate, 0.0);
        assert_eq!((config.width, config.height), (320, 240));
        assert_eq!((config.dst_width, config.dst_height), (Some(640), Some(480)));
        assert_eq!(config.layout, Some(ChannelLayout::Mono1));
        assert_eq!(config.title, "scope");
        assert_eq!(config.update_failure_limit, 5);
        assert_eq!(config.shutdown_timeout_ms, 500);
    }

    #[test]
    fn test_from_parameters() {
        let config = SinkConfig::from_parameters(-1.0, 176, 144, -1, -1);
        let geometry = config.geometry().expect("geometry");
        assert_eq!((geometry.dst_width, geometry.dst_height), (176, 144));

        let config = SinkConfig::from_parameters(25.0, 176, 144, 352, -1);
        let geometry = config.geometry().expect("geometry");
        assert_eq!((geometry.dst_width, geometry.dst_height), (352, 144));

        let config = SinkConfig::from_parameters(25.0, -176, 144, -1, -1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let invalid = SinkConfig {
            width: 0,
            dst_width: Some(0),
            thread_name: String::new(),
            ..Default::default()
        };
        let issues = invalid.validate().expect_err("invalid config");
        assert_eq!(issues.len(), 3);

        let invalid = SinkConfig {
            framerate: f64::NAN,
            ..Default::default()
        };
        assert!(invalid.validate().is_err());
    }
}
