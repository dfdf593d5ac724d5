//! Report email composition and the transport seam it is sent through.

use crate::error::DigestError;
use base64::Engine;
use lettre::Message;
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use std::future::Future;

/// Submits an already encoded RFC 2822 message.
pub trait MailTransport {
    /// Returns the provider-assigned message id.
    fn send_raw(
        &self,
        access_token: &str,
        raw: &str,
    ) -> impl Future<Output = Result<String, DigestError>>;
}

#[derive(Debug, Clone)]
pub struct ReportEmail {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

/// `multipart/mixed`: a plain-text body and one base64 octet-stream attachment.
pub fn build_report_message(email: &ReportEmail) -> Result<Message, DigestError> {
    let from: Mailbox = email.sender.parse()?;
    let to: Mailbox = email.recipient.parse()?;

    // Body::new_with_encoding only fails for encodings that cannot carry the bytes.
    let body = Body::new_with_encoding(email.attachment.clone(), ContentTransferEncoding::Base64)
        .map_err(|_| DigestError::Config("attachment cannot be base64 encoded".to_string()))?;
    let octet_stream = ContentType::parse("application/octet-stream")
        .map_err(|e| DigestError::Config(format!("invalid attachment content type: {e}")))?;
    let attachment = Attachment::new(email.attachment_name.clone()).body(body, octet_stream);

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(email.body.clone()))
                .singlepart(attachment),
        )?;
    Ok(message)
}

/// Whole formatted message as one base64url string, the Gmail `raw` field.
pub fn encode_raw(message: &Message) -> String {
    base64::engine::general_purpose::URL_SAFE.encode(message.formatted())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ReportEmail {
        ReportEmail {
            sender: "bot@example.com".into(),
            recipient: "reader@example.com".into(),
            subject: "Daily Quotes Report (AI Enhanced - Hugging Face)".into(),
            body: "Here is your AI-enhanced quotes CSV file.".into(),
            attachment_name: "quotes.csv".into(),
            attachment: "Quote,Author\nA,X\n".as_bytes().to_vec(),
        }
    }

    #[test]
    fn message_has_body_and_attachment_parts() {
        let message = build_report_message(&report()).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("To: reader@example.com"));
        assert!(formatted.contains("Subject: Daily Quotes Report (AI Enhanced - Hugging Face)"));
        assert!(formatted.contains("multipart/mixed"));
        assert!(formatted.contains("Content-Type: text/plain"));
        assert!(formatted.contains("Content-Type: application/octet-stream"));
        assert!(formatted.contains("filename=\"quotes.csv\""));
        assert!(formatted.contains("Content-Transfer-Encoding: base64"));
    }

    #[test]
    fn raw_is_url_safe_base64_of_the_message() {
        let message = build_report_message(&report()).unwrap();
        let raw = encode_raw(&message);
        assert!(!raw.contains('+') && !raw.contains('/'));
        let decoded = base64::engine::general_purpose::URL_SAFE
            .decode(raw.as_bytes())
            .unwrap();
        assert_eq!(decoded, message.formatted());
    }

    #[test]
    fn invalid_recipient_is_rejected() {
        let mut email = report();
        email.recipient = "not an address".into();
        assert!(matches!(
            build_report_message(&email),
            Err(DigestError::Address(_))
        ));
    }
}
