//! HTML 渲染
//!
//! 所有用户可控文本（文件名、错误信息、data URL）都经过 `escape_html`。

use std::fmt::Write as _;

use super::view::{Banner, FileView, PageView};
use crate::image_handler::ImageKind;

const TITLE: &str = "🖼️ PicLink - Image Upload & Share";

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; color: #262730; }
main { max-width: 1200px; margin: 0 auto; padding: 2rem 1.5rem; }
.columns { display: grid; grid-template-columns: 2fr 1fr; gap: 2rem; }
.preview img { width: 100%; height: auto; border-radius: 4px; }
.caption { color: #6b6f7b; font-size: 0.9rem; margin: 0.25rem 0; }
textarea { width: 100%; height: 150px; font-family: monospace; font-size: 0.8rem; box-sizing: border-box; }
pre.code { background: #f0f2f6; padding: 0.75rem; overflow-x: auto; white-space: pre-wrap; word-break: break-all; }
.button { display: block; width: 100%; box-sizing: border-box; padding: 0.5rem; margin: 0.5rem 0; text-align: center;
  background: #fff; border: 1px solid #d0d3da; border-radius: 6px; color: inherit; text-decoration: none; cursor: pointer; font-size: 1rem; }
.alert { padding: 0.75rem 1rem; border-radius: 6px; margin: 1rem 0; }
.alert.info { background: #e8f0fe; }
.alert.success { background: #e6f4ea; }
.alert.warning { background: #fef7e0; }
.alert.error { background: #fde8e8; }
footer { margin-top: 2rem; border-top: 1px solid #e6e6e6; padding-top: 1rem; }
"#;

const COPY_SCRIPT: &str = "if (navigator.clipboard) { navigator.clipboard.writeText(document.getElementById('data-url').value).catch(function () {}); }";

/// 渲染完整页面。
pub fn render_page(view: &PageView) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>PicLink - Image Upload &amp; Share</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<main>\n");

    let _ = writeln!(html, "<h1>{}</h1>", escape_html(TITLE));
    html.push_str("<p>Upload an image to preview it and get a shareable URL</p>\n");
    render_upload_form(&mut html, matches!(view, PageView::FilePresent(_)));

    match view {
        PageView::Idle { error } => {
            if let Some(banner) = error {
                render_banner(&mut html, banner);
            }
            render_idle(&mut html);
        }
        PageView::FilePresent(file) => render_file(&mut html, file),
    }

    html.push_str("<footer><p>Made with ❤️ By Dhruv Pandya</p></footer>\n");
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// 用于 404/405 等无会话上下文的简单错误页。
pub fn render_error_page(status_line: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body><main><h1>{}</h1><p>{}</p><p><a href=\"/\">Back to PicLink</a></p></main></body>\n</html>\n",
        escape_html(status_line),
        escape_html(status_line),
        escape_html(message)
    )
}

fn render_upload_form(html: &mut String, has_file: bool) {
    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n\
         <label for=\"file\">Choose an image file</label><br>\n\
         <input id=\"file\" type=\"file\" name=\"file\" accept=\"{}\" title=\"Upload an image to preview and share\" onchange=\"this.form.submit()\">\n\
         <noscript><button type=\"submit\">Upload</button></noscript>\n\
         </form>",
        ImageKind::accept_attribute()
    );

    if has_file {
        html.push_str(
            "<form method=\"post\" action=\"/clear\"><button type=\"submit\">✖ Remove file</button></form>\n",
        );
    }
}

fn render_banner(html: &mut String, banner: &Banner) {
    let _ = writeln!(
        html,
        "<div class=\"alert error\" role=\"alert\" data-code=\"{}\">❌ {}</div>",
        banner.code,
        escape_html(&banner.message)
    );
}

fn render_idle(html: &mut String) {
    html.push_str("<div class=\"alert info\">👆 Upload an image to get started!</div>\n");
    html.push_str(
        "<details>\n<summary>ℹ️ How to use</summary>\n<ol>\n\
         <li><strong>Upload an image</strong> using the file uploader above</li>\n\
         <li><strong>Preview</strong> your image on the left side</li>\n\
         <li><strong>Copy the URL</strong> from the right side to share with others</li>\n\
         <li><strong>Paste the URL</strong> in a browser address bar or embed it in HTML/Markdown</li>\n\
         </ol>\n",
    );
    let formats = ImageKind::EXTENSIONS
        .iter()
        .map(|ext| ext.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(html, "<p><strong>Supported formats:</strong> {}</p>", formats);
    html.push_str(
        "<p><strong>Note:</strong> The URL is a data URL that contains the entire image encoded in base64. \
         For very large images, the URL might be very long.</p>\n</details>\n",
    );
}

fn render_file(html: &mut String, file: &FileView) {
    if let Err(banner) = &file.outcome {
        render_banner(html, banner);
    }

    html.push_str("<div class=\"columns\">\n<section class=\"preview\">\n<h3>📸 Image Preview</h3>\n");
    if let Some(data_url) = file.data_url() {
        let _ = writeln!(
            html,
            "<img src=\"{}\" alt=\"{}\">",
            escape_html(data_url),
            escape_html(&file.filename)
        );
    }
    let _ = writeln!(html, "<p class=\"caption\">{}</p>", escape_html(&file.caption_filename()));
    let _ = writeln!(html, "<p class=\"caption\">{}</p>", escape_html(&file.caption_size()));
    if let Some(dimensions) = file.caption_dimensions() {
        let _ = writeln!(html, "<p class=\"caption\">{}</p>", escape_html(&dimensions));
    }
    html.push_str("</section>\n<section class=\"share\">\n<h3>🔗 Share Image</h3>\n");

    if let Ok(share) = &file.outcome {
        let data_url = escape_html(&share.data_url);
        let _ = writeln!(
            html,
            "<label for=\"data-url\">Image Data URL</label>\n\
             <textarea id=\"data-url\" readonly title=\"This is a base64-encoded data URL that contains your image\">{}</textarea>",
            data_url
        );
        let _ = writeln!(
            html,
            "<form method=\"post\" action=\"/copy\"><button class=\"button\" type=\"submit\" onclick=\"{}\">📋 Copy URL to Clipboard</button></form>",
            COPY_SCRIPT
        );

        if file.show_copy_echo {
            let _ = writeln!(html, "<pre class=\"code\"><code>{}</code></pre>", data_url);
            html.push_str("<div class=\"alert success\">✅ URL displayed above! Select and copy it.</div>\n");
        }

        if !share.mime_matches_payload {
            let _ = writeln!(
                html,
                "<div class=\"alert warning\">⚠️ The URL declares {} but its payload is {} data.</div>",
                file.declared_mime, share.encoded_label
            );
        }

        html.push_str(
            "<div class=\"alert info\">💡 <strong>Note:</strong> This is a data URL that embeds the image directly. \
             You can paste it into a browser's address bar or use it in HTML/Markdown. \
             For large images, consider using an image hosting service instead.</div>\n",
        );
    }

    let _ = writeln!(
        html,
        "<a class=\"button\" href=\"/download\" download=\"{}\">⬇️ Download Image</a>",
        escape_html(&file.filename)
    );
    html.push_str("</section>\n</div>\n");
}

/// 转义 HTML 特殊字符。
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
