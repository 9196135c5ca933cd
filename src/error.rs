// One error type for the whole binary.
// Every variant states *where* things went wrong.
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String), // Creating the window failed

    #[error("window update error: {0}")]
    WindowUpdate(String), // Pushing the framebuffer failed

    #[error("config error: {0}")]
    Config(String), // Flags that would produce an empty or broken grid

    #[error("export error for {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
