use std::path::PathBuf;

use thiserror::Error;

/// The four failure classes the tool reports to callers, each with a fixed
/// process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inconsistent or missing user input
    Arg,
    /// The filesystem or a media file refused to cooperate
    Io,
    /// A pipeline stage failed while processing well-formed input
    Runtime,
    /// The recovered data does not match what was recorded at embed time
    Integrity,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Arg => 2,
            ErrorKind::Runtime => 3,
            ErrorKind::Io => 4,
            ErrorKind::Integrity => 5,
        }
    }
}

#[derive(Error, Debug)]
pub enum StegaError {
    /// Represents a channel preset name outside the recognised set
    #[error("unknown channel preset: {0}")]
    UnknownChannel(String),

    /// Represents an embedding rate outside the half-open interval (0, 1]
    #[error("embedding rate must be in (0, 1], got {0}")]
    InvalidRate(f64),

    /// Represents a request for encryption without any password source
    #[error("encryption requested but no password provided")]
    MissingPassword,

    /// Represents a `--pass-env` variable that is not present at call time
    #[error("environment variable {0} is not set")]
    PasswordEnvNotSet(String),

    /// Represents a cover path that does not point at a readable file
    #[error("cover image not found: {0}")]
    CoverNotFound(PathBuf),

    /// Represents a payload path that is neither a file nor a directory
    #[error("payload not found: {0}")]
    PayloadNotFound(PathBuf),

    /// Represents a bench cover directory without a single usable image
    #[error("no cover images found under {0}")]
    NoCoversFound(PathBuf),

    #[error("no cover image set")]
    CoverNotSet,

    #[error("no stego container set")]
    StegoNotSet,

    #[error("no payload set")]
    PayloadNotSet,

    #[error("no output path set")]
    OutputNotSet,

    /// Represents a failure to read from input
    #[error("read error on {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Represents a failure to write an output file
    #[error("write error on {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Represents a carrier that could not be decoded as an image
    #[error("image decoding failed")]
    ImageDecode(#[source] image::ImageError),

    /// Represents a failure while encoding the stego image
    #[error("image encoding failed")]
    ImageEncode(#[source] image::ImageError),

    /// Represents all other cases of `std::io::Error`
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Represents a compression stage failure before any output was committed
    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// Represents a compressed blob whose 5-byte signature matches no codec
    #[error("unknown compression signature")]
    UnknownSignature,

    /// Represents structural damage inside a compressed stream
    #[error("corrupt compressed stream: {0}")]
    CorruptStream(&'static str),

    /// Represents a decompressed length that contradicts the stream header
    #[error("decompressed length {got} does not match recorded length {expected}")]
    LengthMismatch { expected: usize, got: usize },

    /// Represents a carrier too small for the requested payload at the
    /// negotiated rate
    #[error("not enough capacity: {required} bits required but only {available} available")]
    NotEnoughCapacity { required: usize, available: usize },

    /// Represents a stego pixel grid that kept disagreeing with its own
    /// JPEG encoding during verification
    #[error("embedding did not stabilise: {blocks} block(s) failed verification against the produced jpeg")]
    EmbeddingUnstable { blocks: usize },

    /// Represents a failure inside the AEAD encryption primitive
    #[error("encryption failed")]
    EncryptionFailed,

    /// Represents a cover/stego pair whose pixel grids cannot be compared
    #[error("cover and stego dimensions differ")]
    DimensionMismatch,

    /// Represents a container with no payload marker anywhere
    #[error("payload marker not found in container")]
    MarkerNotFound,

    /// Represents a cover that already contains the payload marker
    #[error("cover already contains the payload marker, use a different cover")]
    MarkerCollision,

    /// Represents a metadata block that is not the JSON record written at
    /// embed time
    #[error("metadata block is malformed: {0}")]
    MetadataMalformed(String),

    /// Represents a framed blob cut short of its recorded extent
    #[error("payload frame is truncated")]
    FrameTruncated,

    /// Represents a recovered payload whose digest contradicts the metadata
    #[error("checksum mismatch: recovered payload does not match recorded digest")]
    ChecksumMismatch,

    /// Represents an AEAD open failure: wrong password or tampered data
    #[error("decryption failed: wrong password or corrupted data")]
    DecryptionFailed,

    /// Represents an encrypted payload met without any password to open it
    #[error("payload is encrypted and no password was provided")]
    PasswordRequired,

    /// Represents an error while packing or unpacking a directory payload
    #[error("archive error")]
    Archive(#[from] zip::result::ZipError),
}

impl StegaError {
    /// Classify this error into the coarse taxonomy used for exit codes.
    pub fn kind(&self) -> ErrorKind {
        use StegaError::*;
        match self {
            UnknownChannel(_) | InvalidRate(_) | MissingPassword | PasswordEnvNotSet(_)
            | CoverNotFound(_) | PayloadNotFound(_) | NoCoversFound(_) | CoverNotSet
            | StegoNotSet | PayloadNotSet | OutputNotSet => ErrorKind::Arg,

            ReadError { .. } | WriteError { .. } | ImageDecode(_) | ImageEncode(_) | Io(_) => {
                ErrorKind::Io
            }

            CompressionFailed(_) | UnknownSignature | CorruptStream(_) | LengthMismatch { .. }
            | NotEnoughCapacity { .. } | EmbeddingUnstable { .. } | EncryptionFailed
            | DimensionMismatch | Archive(_) => ErrorKind::Runtime,

            MarkerNotFound | MarkerCollision | MetadataMalformed(_) | FrameTruncated
            | ChecksumMismatch | DecryptionFailed | PasswordRequired => ErrorKind::Integrity,
        }
    }

    /// Process exit code for this error, stable across releases.
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_taxonomy() {
        assert_eq!(StegaError::MissingPassword.exit_code(), 2);
        assert_eq!(
            StegaError::NotEnoughCapacity {
                required: 10,
                available: 1
            }
            .exit_code(),
            3
        );
        assert_eq!(
            StegaError::ReadError {
                path: PathBuf::from("x"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
            .exit_code(),
            4
        );
        assert_eq!(StegaError::MarkerNotFound.exit_code(), 5);
        assert_eq!(StegaError::ChecksumMismatch.exit_code(), 5);
    }

    #[test]
    fn io_errors_map_to_the_io_kind() {
        let err: StegaError = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
