/*
 * Responsibility
 * - GET / : small HTML page whose inline script carries the request nonce
 *   (lets an operator check a nonce-based CSP in a browser)
 */
use axum::{Extension, response::Html};

use crate::middleware::CspNonce;

pub async fn index(Extension(nonce): Extension<CspNonce>) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html><head><title>security headers</title></head><body>\
         <p id=\"status\">inline script blocked</p>\
         <script nonce=\"{nonce}\">document.getElementById('status').textContent = 'inline script allowed';</script>\
         </body></html>\n",
        nonce = nonce.as_str()
    ))
}
