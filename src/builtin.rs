pub const FEED_CSS: &str = include_str!("feed.css");

pub const DEFAULT_PLACEHOLDER_IMAGE: &str =
    "https://via.placeholder.com/400x250/667eea/white?text=Image+unavailable";

/// Page-wide fallback: any `<img>` that fails to load is swapped for the
/// placeholder named on `<body data-placeholder-image>`. Capture phase, since
/// `error` does not bubble.
pub const IMAGE_FALLBACK_JS: &str = r#"(function () {
  var placeholder = document.body.getAttribute("data-placeholder-image");
  if (!placeholder) return;

  document.addEventListener(
    "error",
    function (e) {
      var target = e.target;
      if (!target || target.tagName !== "IMG") return;
      if (target.getAttribute("src") === placeholder) return;
      target.setAttribute("src", placeholder);
    },
    true
  );
})();"#;

/// Inline `onerror` for a single image. Clears itself first so a broken
/// placeholder cannot loop.
pub fn image_onerror(placeholder: &str) -> String {
    format!(
        "this.onerror=null;this.src='{}'",
        placeholder.replace('\\', "%5C").replace('\'', "%27")
    )
}
