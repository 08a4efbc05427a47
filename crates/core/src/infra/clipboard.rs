use async_trait::async_trait;

/// クリップボードエラー
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard not available: {0}")]
    Unavailable(String),
    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),
}

/// クリップボード書き込み先 trait
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// arboard を使うシステムクリップボード
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_string();
        let len = text.chars().count();
        // X11 などでは書き込みがブロックすることがある
        tokio::task::spawn_blocking(move || {
            let mut ctx = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            ctx.set_text(text)
                .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
        })
        .await
        .map_err(|e| ClipboardError::Unavailable(format!("clipboard task: {e}")))??;

        log::info!("クリップボードに出力: {len} 文字");
        Ok(())
    }
}
