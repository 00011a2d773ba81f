//! The [`ImageReader`] façade.
//!
//! Routes each request to a backend, runs it, and turns any failure into a
//! placeholder image. Callers always get an [`ImageResult`] back:
//!
//! ```text
//! ImageRequest ─► EngineSelector ─┬─► RasterDecoder ───────────────┐
//!                                 ├─► LegacyTranscoder ─► Raster ──┼─► ImageResult
//!                                 └─► ExternalToolTranscoder ─► ...┘
//!                                         (any error) ─► ErrorImageFactory
//! ```
//!
//! [`ImageReader::read`] takes `&self` and keeps no per-call state, so one
//! reader can serve many threads. [`ImageReader::read_image`] additionally
//! remembers the last result's metadata for callers that inspect it after
//! the call.

use crate::config::ReaderConfig;
use crate::imaging::{
    ConversionTool, Dimensions, ErrorImageFactory, ExternalToolTranscoder, ImageCrateCodec,
    ImageInfo, ImageRequest, ImageResult, IntermediateStore, LegacyCodec, LegacyTranscoder,
    RasterDecoder, ReaderError, SCALE_NOT_APPLICABLE, ShellTool,
};
use crate::routing::{Backend, EngineSelector};
use std::path::Path;

pub struct ImageReader {
    config: ReaderConfig,
    selector: EngineSelector,
    raster: RasterDecoder,
    legacy: Option<LegacyTranscoder>,
    external: ExternalToolTranscoder,
    errors: ErrorImageFactory,
    last: Option<ImageInfo>,
}

impl ImageReader {
    /// Build a reader with the bundled legacy codec and the configured
    /// external tool.
    pub fn new(config: &ReaderConfig) -> Self {
        let intermediates = intermediate_store(config);
        let errors = ErrorImageFactory::new(config.error_image.size());
        let tool = ShellTool {
            program: config.external_tool.program.clone(),
            package: config.external_tool.package.clone(),
            timeout: config.external_tool.timeout(),
        };
        Self {
            config: config.clone(),
            selector: config.selector(true),
            raster: RasterDecoder::new(),
            legacy: Some(LegacyTranscoder::new(
                Box::new(ImageCrateCodec),
                intermediates.clone(),
                errors,
            )),
            external: ExternalToolTranscoder::new(Box::new(tool), intermediates),
            errors,
            last: None,
        }
    }

    /// Replace the legacy codec. `None` means no legacy decoder is
    /// installed, so every non-external file goes to the native decoder.
    pub fn with_legacy_codec(mut self, codec: Option<Box<dyn LegacyCodec>>) -> Self {
        self.legacy = codec.map(|codec| {
            LegacyTranscoder::new(codec, intermediate_store(&self.config), self.errors)
        });
        self.selector = self.config.selector(self.legacy.is_some());
        self
    }

    /// Replace the external conversion tool.
    pub fn with_conversion_tool(mut self, tool: Box<dyn ConversionTool>) -> Self {
        self.external = ExternalToolTranscoder::new(tool, intermediate_store(&self.config));
        self
    }

    /// Which backend a file name routes to.
    pub fn classify(&self, path: &Path) -> Backend {
        self.selector.classify_path(path)
    }

    /// Read `request`, substituting a placeholder on failure.
    pub fn read(&self, request: &ImageRequest) -> ImageResult {
        match self.try_read(request) {
            Ok(result) => result,
            Err(e) => {
                log::error!("failed to load {}: {e}", request.path().display());
                self.errors.build(&e.to_string())
            }
        }
    }

    /// Read `request`, returning the backend's error instead of a
    /// placeholder.
    pub fn try_read(&self, request: &ImageRequest) -> Result<ImageResult, ReaderError> {
        let path = request.path();
        let view = &request.view;
        let backend = self.classify(path);
        log::debug!("{} -> {backend} backend", path.display());

        match backend {
            Backend::ExternalTool if self.is_tool_suffix(path) => self.external.read(path, view),
            Backend::AlternateDecoder => match &self.legacy {
                Some(legacy) => legacy.read(path, view),
                None => self.raster.read(path, view),
            },
            Backend::ExternalTool => {
                log::debug!(
                    "no external pipeline for {}; using the native decoder",
                    path.display()
                );
                self.raster.read(path, view)
            }
            Backend::Raster => self.raster.read(path, view),
        }
    }

    /// Like [`read`](Self::read), and remember the result's metadata for
    /// the accessors below.
    pub fn read_image(&mut self, request: &ImageRequest) -> ImageResult {
        let result = self.read(request);
        self.last = Some(result.info());
        result
    }

    /// Metadata of the last [`read_image`](Self::read_image) call.
    pub fn last_info(&self) -> Option<&ImageInfo> {
        self.last.as_ref()
    }

    pub fn original_size(&self) -> Dimensions {
        self.last
            .as_ref()
            .map_or(Dimensions::new(0, 0), |info| info.original_size)
    }

    pub fn format(&self) -> &str {
        self.last.as_ref().map_or("", |info| info.format.as_str())
    }

    /// `-1.0` when not applicable.
    pub fn scale_factor1(&self) -> f32 {
        self.last
            .as_ref()
            .and_then(|info| info.scale_factor1)
            .unwrap_or(SCALE_NOT_APPLICABLE)
    }

    /// `-1.0` when not applicable.
    pub fn scale_factor2(&self) -> f32 {
        self.last
            .as_ref()
            .and_then(|info| info.scale_factor2)
            .unwrap_or(SCALE_NOT_APPLICABLE)
    }

    pub fn is_animated(&self) -> bool {
        self.last.as_ref().is_some_and(|info| info.is_animated)
    }

    fn is_tool_suffix(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.config.external_tool.suffix))
    }
}

fn intermediate_store(config: &ReaderConfig) -> IntermediateStore {
    IntermediateStore::new(
        config.intermediates.effective_dir(),
        config.intermediates.keep,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Rotation;
    use crate::imaging::backend::tests::{FailingCodec, MockTool, RecordedCall};
    use crate::test_helpers::*;
    use std::sync::Arc;

    /// A reader whose intermediates land in `work`.
    fn reader_in(work: &Path) -> ImageReader {
        let mut config = ReaderConfig::default();
        config.intermediates.dir = Some(work.to_path_buf());
        ImageReader::new(&config)
    }

    fn request(path: &Path) -> ImageRequest {
        ImageRequest::new(path, Dimensions::new(100, 100))
    }

    fn assert_placeholder(result: &ImageResult) {
        assert!(result.is_placeholder());
        assert_eq!(result.format, "");
        assert_eq!(result.scale_factor1, None);
        assert_eq!(result.scale_factor2, None);
        assert!(!result.is_animated);
        assert!(!result.error.as_deref().unwrap_or("").is_empty());
    }

    #[test]
    fn native_file_reads_directly() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("photo.png");
        create_test_png(&path, 400, 300);

        let reader = reader_in(tmp.path());
        assert_eq!(reader.classify(&path), Backend::Raster);
        let result = reader.read(&request(&path));
        assert_eq!(result.format, "png");
        assert_eq!((result.pixels.width(), result.pixels.height()), (100, 75));
    }

    #[test]
    fn legacy_file_goes_through_transcoder() {
        let tmp = tempfile::TempDir::new().unwrap();
        let work = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("shot.tga");
        create_test_tga(&path, 50, 40);

        let reader = reader_in(work.path());
        assert_eq!(reader.classify(&path), Backend::AlternateDecoder);
        let result = reader.read(&request(&path));
        assert!(!result.is_placeholder());
        assert_eq!(result.original_size, Dimensions::new(50, 40));
        assert_eq!(result.format, "");
        assert!(file_names(work.path()).is_empty());
    }

    #[test]
    fn without_legacy_codec_everything_is_native() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("shot.tga");
        create_test_tga(&path, 50, 40);

        let reader = reader_in(tmp.path()).with_legacy_codec(None);
        assert_eq!(reader.classify(&path), Backend::Raster);
        let result = reader.read(&request(&path));
        assert_eq!(result.format, "tga");
        assert_eq!(result.original_size, Dimensions::new(50, 40));
    }

    #[test]
    fn legacy_failure_yields_placeholder() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.ico");
        std::fs::write(&path, b"garbage").unwrap();

        let reader = reader_in(tmp.path()).with_legacy_codec(Some(Box::new(FailingCodec)));
        let result = reader.read(&request(&path));
        assert_placeholder(&result);
        assert_eq!(result.error.as_deref(), Some("corrupt image header"));
    }

    #[test]
    fn missing_tool_gives_not_found_placeholder_and_no_temp_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let work = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("drawing.xcf");
        std::fs::write(&path, b"gimp xcf v011").unwrap();

        let tool = Arc::new(MockTool::missing());
        let reader = reader_in(work.path()).with_conversion_tool(Box::new(Arc::clone(&tool)));
        assert_eq!(reader.classify(&path), Backend::ExternalTool);

        let result = reader.read(&request(&path));
        assert_placeholder(&result);
        let message = result.error.unwrap();
        assert!(message.contains("'mocktools'"), "{message}");
        assert!(message.contains("wasn't found"), "{message}");
        assert_eq!(tool.get_calls(), vec![RecordedCall::Probe]);
        assert!(file_names(work.path()).is_empty());
    }

    #[test]
    fn installed_tool_output_is_decoded() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("Drawing.XCF");
        std::fs::write(&path, b"gimp xcf v011").unwrap();

        let reader = reader_in(tmp.path())
            .with_conversion_tool(Box::new(MockTool::converting(Dimensions::new(300, 600))));
        let result = reader.read(&request(&path));
        assert!(!result.is_placeholder());
        assert_eq!(result.original_size, Dimensions::new(300, 600));
        assert_eq!((result.pixels.width(), result.pixels.height()), (50, 100));
    }

    #[test]
    fn other_external_suffixes_fall_back_to_native() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("scan.png");
        create_test_png(&path, 10, 10);

        let mut config = ReaderConfig::default();
        config.routing.external = "*.xcf,*.png".into();
        let tool = Arc::new(MockTool::missing());
        let reader = ImageReader::new(&config).with_conversion_tool(Box::new(Arc::clone(&tool)));

        assert_eq!(reader.classify(&path), Backend::ExternalTool);
        let result = reader.read(&request(&path));
        assert_eq!(result.format, "png");
        assert!(tool.get_calls().is_empty());
    }

    #[test]
    fn decode_failure_yields_placeholder() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nnot really").unwrap();

        let result = reader_in(tmp.path()).read(&request(&path));
        assert_placeholder(&result);
    }

    #[test]
    fn missing_file_yields_placeholder() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = reader_in(tmp.path()).read(&request(&tmp.path().join("gone.jpg")));
        assert_placeholder(&result);
    }

    #[test]
    fn try_read_exposes_the_error_kind() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.svg");
        std::fs::write(&path, "<svg").unwrap();

        let err = reader_in(tmp.path()).try_read(&request(&path)).unwrap_err();
        assert!(matches!(err, ReaderError::InvalidVectorData(_)));
    }

    #[test]
    fn placeholder_size_follows_config() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = ReaderConfig::default();
        config.error_image.width = 320;
        config.error_image.height = 240;
        let result = ImageReader::new(&config).read(&request(&tmp.path().join("gone.png")));
        assert_eq!(result.original_size, Dimensions::new(320, 240));
    }

    // =========================================================================
    // Compatibility accessors
    // =========================================================================

    #[test]
    fn accessors_before_any_read() {
        let reader = ImageReader::new(&ReaderConfig::default());
        assert!(reader.last_info().is_none());
        assert_eq!(reader.format(), "");
        assert_eq!(reader.scale_factor1(), SCALE_NOT_APPLICABLE);
        assert!(!reader.is_animated());
    }

    #[test]
    fn accessors_track_last_read() {
        let tmp = tempfile::TempDir::new().unwrap();
        let wide = tmp.path().join("wide.jpg");
        let anim = tmp.path().join("anim.gif");
        create_test_jpeg(&wide, 400, 300);
        create_test_gif(&anim, 8, 8, 2);

        let mut reader = reader_in(tmp.path());
        let zoomed = ImageRequest::new(&wide, Dimensions::new(100, 100)).zoomed(true);
        reader.read_image(&zoomed);
        assert_eq!(reader.original_size(), Dimensions::new(400, 300));
        assert_eq!(reader.format(), "jpg");
        assert_eq!(reader.scale_factor1(), 0.25);
        assert_eq!(reader.scale_factor2(), SCALE_NOT_APPLICABLE);
        assert!(!reader.is_animated());

        reader.read_image(&request(&anim));
        assert_eq!(reader.format(), "gif");
        assert_eq!(reader.scale_factor1(), SCALE_NOT_APPLICABLE);
        assert!(reader.is_animated());
    }

    #[test]
    fn accessors_after_failure_report_placeholder() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut reader = reader_in(tmp.path());
        reader.read_image(&request(&tmp.path().join("gone.png")).rotation(Rotation::Quarter));
        assert_eq!(reader.format(), "");
        assert_eq!(reader.original_size(), Dimensions::new(640, 480));
        assert_eq!(reader.scale_factor2(), SCALE_NOT_APPLICABLE);
        assert!(reader.last_info().unwrap().error.is_some());
    }

    #[test]
    fn reader_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<ImageReader>();
    }
}
