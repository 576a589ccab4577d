use std::path::PathBuf;

/// Background image the quote is rendered onto.
pub const BACKGROUND_FILE_NAME: &str = "bg.png";

/// Font used for rendering the quote body.
pub const FONT_FILE_NAME: &str = "font_tn.ttf";

/// Output-image template; overwritten by the renderer during the run.
pub const TEMPLATE_FILE_NAME: &str = "output_image.png";

/// A file downloaded into the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    /// Remote (and local) file name.
    pub name: String,
    /// Local path the asset was written to.
    pub path: PathBuf,
    pub size_bytes: u64,
}
