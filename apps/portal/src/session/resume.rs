use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::AppError;

/// Reads a résumé file and encodes it as a `data:<mime>;base64,...` URL.
///
/// The read is abandoned as soon as `token` is cancelled (logout), in which
/// case `SessionClosed` is returned and nothing is encoded.
pub async fn encode_data_url(path: &Path, token: &CancellationToken) -> Result<String, AppError> {
    let bytes = tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!(path = %path.display(), "Résumé read aborted");
            return Err(AppError::SessionClosed);
        }
        read = tokio::fs::read(path) => read?,
    };
    if token.is_cancelled() {
        return Err(AppError::SessionClosed);
    }
    if bytes.is_empty() {
        return Err(AppError::Validation(format!(
            "Résumé file '{}' is empty",
            path.display()
        )));
    }

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_pdf_is_encoded_with_mime() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF").unwrap();
        let url = encode_data_url(file.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(url, "data:application/pdf;base64,JVBERg==");
    }

    #[tokio::test]
    async fn test_unknown_extension_is_octet_stream() {
        let mut file = tempfile::Builder::new().suffix(".zzz").tempfile().unwrap();
        file.write_all(b"abc").unwrap();
        let url = encode_data_url(file.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(url.starts_with("data:application/octet-stream;base64,"));
    }

    #[tokio::test]
    async fn test_cancelled_read_is_aborted() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let err = encode_data_url(file.path(), &token).await.unwrap_err();
        assert!(matches!(err, AppError::SessionClosed));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = encode_data_url(Path::new("/nonexistent/cv.pdf"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let err = encode_data_url(file.path(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
