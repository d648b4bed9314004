//! Reads local files into the payload expected by `ir.attachment`.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use odoolink_application::EntityOperations;
use odoolink_core::{AppError, AppResult};
use odoolink_domain::CallContext;

/// How file contents become the `datas` payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttachmentEncoding {
    /// Binary contents, base64 encoded.
    #[default]
    Base64,
    /// UTF-8 text sent as is, for files that already hold encoded data.
    RawText,
}

/// File contents ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAttachment {
    /// Attachment name, the file name unless overridden.
    pub name: String,
    /// Payload in the requested encoding.
    pub datas: String,
}

impl LocalAttachment {
    /// Reads the file at `path` and prepares its payload.
    pub fn read(path: &Path, encoding: AttachmentEncoding) -> AppResult<Self> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "attachment path '{}' has no file name",
                    path.display()
                ))
            })?
            .to_owned();
        let read_error = |error: std::io::Error| {
            AppError::Validation(format!(
                "failed to read attachment '{}': {error}",
                path.display()
            ))
        };

        let datas = match encoding {
            AttachmentEncoding::Base64 => STANDARD.encode(std::fs::read(path).map_err(read_error)?),
            AttachmentEncoding::RawText => std::fs::read_to_string(path).map_err(read_error)?,
        };

        Ok(Self { name, datas })
    }

    /// Replaces the attachment name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Options of [`upload_attachment`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentUpload {
    /// Record the attachment belongs to.
    pub res_id: Option<i64>,
    /// Name overriding the file name.
    pub name: Option<String>,
    /// Payload encoding.
    pub encoding: AttachmentEncoding,
}

/// Uploads a local file as an attachment of one record of `target`.
pub async fn upload_attachment(
    target: &dyn EntityOperations,
    path: &Path,
    upload: &AttachmentUpload,
    context: Option<&CallContext>,
) -> AppResult<i64> {
    let mut attachment = LocalAttachment::read(path, upload.encoding)?;
    if let Some(name) = &upload.name {
        attachment = attachment.named(name.as_str());
    }

    target
        .create_attachment(
            attachment.name.as_str(),
            attachment.datas.as_str(),
            upload.res_id,
            context,
        )
        .await
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use odoolink_core::AppError;

    use super::{AttachmentEncoding, LocalAttachment};

    fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
        let directory = std::env::temp_dir().join(format!("odoolink-{}", uuid::Uuid::new_v4()));
        if let Err(error) = std::fs::create_dir_all(&directory) {
            panic!("failed to create scratch directory: {error}");
        }
        let path = directory.join(name);
        if let Err(error) = std::fs::write(&path, contents) {
            panic!("failed to write scratch file: {error}");
        }
        path
    }

    #[test]
    fn encodes_file_contents_and_keeps_file_name() {
        let path = scratch_file("hello.txt", b"hello");

        let attachment = LocalAttachment::read(&path, AttachmentEncoding::Base64);

        assert_eq!(
            attachment.ok(),
            Some(LocalAttachment {
                name: "hello.txt".to_owned(),
                datas: "aGVsbG8=".to_owned(),
            })
        );
    }

    #[test]
    fn raw_text_is_sent_unencoded() {
        let path = scratch_file("logo.b64", b"iVBORw0KGgo=");

        let attachment = LocalAttachment::read(&path, AttachmentEncoding::RawText)
            .map(|attachment| attachment.named("logo.png"));

        assert_eq!(
            attachment.ok(),
            Some(LocalAttachment {
                name: "logo.png".to_owned(),
                datas: "iVBORw0KGgo=".to_owned(),
            })
        );
    }

    #[test]
    fn raw_text_rejects_binary_contents() {
        let path = scratch_file("blob.bin", &[0xff, 0xfe, 0x00]);

        assert!(matches!(
            LocalAttachment::read(&path, AttachmentEncoding::RawText),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn missing_file_is_a_validation_error() {
        let path = std::env::temp_dir().join(format!("odoolink-missing-{}", uuid::Uuid::new_v4()));

        assert!(matches!(
            LocalAttachment::read(&path, AttachmentEncoding::Base64),
            Err(AppError::Validation(_))
        ));
    }
}
