//! Loopback redirect receiver for the installed-app authorization flow.

use crate::error::DigestError;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};
use url::Url;

/// Requests whose head grows past this are dropped unparsed.
const MAX_REQUEST_HEAD: usize = 16 * 1024;

/// Listener bound before the browser is opened, so the redirect cannot race it.
pub struct CallbackListener {
    listener: TcpListener,
    addr: SocketAddr,
}

impl CallbackListener {
    /// Bind `127.0.0.1` on an OS-assigned port.
    pub async fn bind() -> Result<Self, DigestError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/", self.addr.port())
    }

    /// Wait for the redirect and return the authorization code.
    ///
    /// `wait` bounds the whole exchange. Connections are served concurrently, so a
    /// browser's idle pre-connect or a `/favicon.ico` fetch cannot hold up the
    /// redirect. The first request carrying `code`, `state` or `error` decides the
    /// outcome; dropping the task set on return closes any connection still open.
    pub async fn wait_for_code(
        self,
        expected_state: &str,
        wait: Duration,
    ) -> Result<String, DigestError> {
        let deadline = Instant::now() + wait;
        let mut connections = JoinSet::new();

        let outcome = timeout_at(deadline, async {
            loop {
                tokio::select! {
                    accepted = self.listener.accept() => {
                        let (socket, peer) = match accepted {
                            Ok(conn) => conn,
                            Err(e) => return Err(DigestError::from(e)),
                        };
                        debug!(%peer, "OAuth callback connection accepted");
                        let expected = expected_state.to_owned();
                        connections.spawn(async move { serve_connection(socket, &expected).await });
                    }
                    Some(joined) = connections.join_next() => match joined {
                        Ok(Some(result)) => return result,
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "OAuth callback connection task failed"),
                    },
                }
            }
        })
        .await;

        outcome.unwrap_or(Err(DigestError::OauthCallbackTimeout))
    }
}

/// Serve one connection. `None` means it carried no callback and is ignored.
async fn serve_connection(
    mut socket: TcpStream,
    expected_state: &str,
) -> Option<Result<String, DigestError>> {
    let head = match read_request_head(&mut socket).await {
        Ok(Some(head)) => head,
        Ok(None) => {
            debug!("OAuth callback connection closed without a request");
            return None;
        }
        Err(e) => {
            debug!(error = %e, "OAuth callback connection read failed");
            return None;
        }
    };

    if !is_callback(&head) {
        debug!(
            request = head.lines().next().unwrap_or_default(),
            "ignoring non-callback request"
        );
        if let Err(e) = socket.write_all(not_found_response().as_bytes()).await {
            debug!(error = %e, "could not answer non-callback request");
        }
        return None;
    }

    let result = parse_callback(&head, expected_state);
    let reply = match &result {
        Ok(_) => success_response(),
        Err(err) => error_response(&err.to_string()),
    };
    if let Err(e) = socket.write_all(reply.as_bytes()).await {
        warn!(error = %e, "could not write the OAuth callback page");
    }
    let _ = socket.shutdown().await;
    Some(result)
}

/// Read up to the blank line ending the request head. `None` on early EOF or an oversized head.
async fn read_request_head(socket: &mut TcpStream) -> io::Result<Option<String>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            return Ok(Some(String::from_utf8_lossy(&buf[..end]).into_owned()));
        }
        if buf.len() > MAX_REQUEST_HEAD {
            return Ok(None);
        }
    }
}

fn request_target(request: &str) -> Option<Url> {
    let target = request.lines().next()?.split_whitespace().nth(1)?;
    Url::parse("http://localhost").ok()?.join(target).ok()
}

fn is_callback(request: &str) -> bool {
    request_target(request).is_some_and(|url| {
        url.query_pairs()
            .any(|(key, _)| matches!(key.as_ref(), "code" | "state" | "error"))
    })
}

/// Extract `code` from `GET /?state=..&code=.. HTTP/1.1`, checking `state`.
fn parse_callback(request: &str, expected_state: &str) -> Result<String, DigestError> {
    let url = request_target(request)
        .ok_or_else(|| DigestError::OauthFlowError("malformed callback request".to_string()))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(DigestError::OauthFlowError(format!(
            "authorization denied: {error}"
        )));
    }
    match state {
        Some(s) if s == expected_state => {}
        Some(_) => {
            return Err(DigestError::OauthFlowError(
                "CSRF token mismatch".to_string(),
            ));
        }
        None => {
            return Err(DigestError::OauthFlowError(
                "missing `state` in callback".to_string(),
            ));
        }
    }
    code.filter(|c| !c.is_empty())
        .ok_or_else(|| DigestError::OauthFlowError("missing `code` in callback".to_string()))
}

fn success_response() -> String {
    page("200 OK", "Authorization complete. You can close this window.")
}

fn error_response(message: &str) -> String {
    page("400 Bad Request", message)
}

fn not_found_response() -> String {
    page("404 Not Found", "Not found.")
}

fn page(status: &str, message: &str) -> String {
    let body = format!(
        "<!DOCTYPE html><html><body><p>{}</p></body></html>",
        escape_html(message)
    );
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// `error` comes from the query string, so the page text is escaped.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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
