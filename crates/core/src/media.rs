//! Media-type inference for uploaded assets.

/// Resolve the content type for an asset key from its file extension.
///
/// Used when the source response declares no content type of its own.
/// Unknown extensions fall back to an opaque binary type.
pub fn content_type_for_key(key: &str) -> &'static str {
    let extension = key
        .rsplit('/')
        .next()
        .and_then(|file| file.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .unwrap_or("");

    match extension.to_ascii_lowercase().as_str() {
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" => "application/json; charset=utf-8",
        "map" => "application/json; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_and_stylesheet_types() {
        assert_eq!(
            content_type_for_key("jquery.min.js"),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(
            content_type_for_key("dist/theme.min.css"),
            "text/css; charset=utf-8"
        );
    }

    #[test]
    fn test_source_map_is_json() {
        assert_eq!(
            content_type_for_key("jquery.min.map"),
            "application/json; charset=utf-8"
        );
    }

    #[test]
    fn test_font_types() {
        assert_eq!(content_type_for_key("fonts/KaTeX_Main.woff2"), "font/woff2");
        assert_eq!(content_type_for_key("fonts/fa-solid.TTF"), "font/ttf");
    }

    #[test]
    fn test_unknown_extension_is_binary() {
        assert_eq!(content_type_for_key("archive.tar.zst"), "application/octet-stream");
        assert_eq!(content_type_for_key("LICENSE"), "application/octet-stream");
    }

    #[test]
    fn test_extension_taken_from_last_path_segment() {
        // A dot in a directory name must not be mistaken for the extension.
        assert_eq!(
            content_type_for_key("v1.2/bundle"),
            "application/octet-stream"
        );
    }
}
