use std::fmt;
use std::path::{Path, PathBuf};

use crate::commands::{self, ExtractReport, ExtractRequest};
use crate::error::StegaError;
use crate::result::Result;

/// Prepares the extract API for further configuration.
pub fn prepare() -> ExtractApi {
    ExtractApi::default()
}

#[derive(Default)]
pub struct ExtractApi {
    stego: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    password: Option<String>,
}

impl fmt::Debug for ExtractApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractApi")
            .field("stego", &self.stego)
            .field("out_dir", &self.out_dir)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ExtractApi {
    /// The container holding a hidden payload.
    pub fn with_stego<A: AsRef<Path>>(mut self, stego: A) -> Self {
        self.stego = Some(stego.as_ref().to_path_buf());
        self
    }

    /// Directory the recovered payload is written into.
    pub fn with_output_dir<A: AsRef<Path>>(mut self, out_dir: A) -> Self {
        self.out_dir = Some(out_dir.as_ref().to_path_buf());
        self
    }

    /// Password for encrypted payloads; plaintext ones need none.
    pub fn using_password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Execute the extraction and block until the payload is written.
    pub fn execute(self) -> Result<ExtractReport> {
        let Some(stego) = self.stego else {
            return Err(StegaError::StegoNotSet);
        };
        let Some(out_dir) = self.out_dir else {
            return Err(StegaError::OutputNotSet);
        };

        commands::extract(&ExtractRequest {
            stego,
            out_dir,
            password: self.password,
        })
    }
}
