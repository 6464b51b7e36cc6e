use std::path::Path;

use time::{OffsetDateTime, macros::format_description};
use tokio::fs as async_fs;

/// Write `content` to `path`, creating missing parent directories.
pub async fn write(path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }
    async_fs::write(path, content).await
}

/// Format a timestamp the way listings show it, e.g. `Mar 7, 2025`.
#[must_use]
pub fn display_date(date: OffsetDateTime) -> String {
    let format = format_description!("[month repr:short] [day padding:none], [year]");
    date.format(format).unwrap_or_else(|_| date.date().to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn dates_read_like_listings() {
        assert_eq!(display_date(datetime!(2025-03-07 12:00 UTC)), "Mar 7, 2025");
    }
}
