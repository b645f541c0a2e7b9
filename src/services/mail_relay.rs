use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::MailConfig;

pub const SUBJECT: &str = "Gráficas Estadísticas - Sistema de Movilidad";
pub const ATTACHMENT_NAME: &str = "graficas.pdf";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("PDF is {size_mb:.2} MB, limit is {limit_mb:.2} MB")]
    TooLarge { size_mb: f64, limit_mb: f64 },

    #[error("mail server did not respond")]
    NoResponse,

    #[error("mail server rejected the message: {0}")]
    Rejected(Value),

    #[error("mail transport error: {0}")]
    Transport(String),

    #[error("MAIL_API_KEY is not configured")]
    MissingApiKey,
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        MailError::Transport(err.to_string())
    }
}

/// A message ready for the relay
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachment: Vec<u8>,
    pub attachment_name: String,
}

/// Delivers a message and returns the relay's raw reply body
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<String, MailError>;
}

/// Multipart client for the institutional mail API
pub struct HttpMailRelay {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpMailRelay {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        // The relay host presents a certificate that does not validate.
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailRelay {
    async fn send(&self, mail: OutgoingMail) -> Result<String, MailError> {
        if self.api_key.is_empty() {
            return Err(MailError::MissingApiKey);
        }

        let attachment = reqwest::multipart::Part::bytes(mail.attachment)
            .file_name(mail.attachment_name)
            .mime_str("application/pdf")?;

        let form = reqwest::multipart::Form::new()
            .text("key_api", self.api_key.clone())
            .text("tipo_mensaje", "archivos")
            .text("destino", mail.to)
            .text("asunto", mail.subject)
            .text("contenido", mail.html)
            .text("archivos_length", "1")
            .part("archivo0", attachment);

        // Any status is accepted; the body decides success.
        let response = self.client.post(&self.api_url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        info!("Mail relay answered with status {}", status);
        Ok(body)
    }
}

/// What the client gets back after a queued send
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailReceipt {
    #[serde(rename = "threadId")]
    pub thread_id: Option<Value>,
    pub estado: String,
    pub destino: String,
}

/// A PDF report to mail
#[derive(Debug, Clone)]
pub struct PdfReport {
    pub pdf: Vec<u8>,
    pub email: String,
    pub dataset: Option<String>,
    pub filters: Option<Value>,
}

/// Shrink, package and relay a PDF report
pub async fn send_pdf_report(
    transport: &dyn MailTransport,
    config: &MailConfig,
    report: PdfReport,
) -> Result<MailReceipt, MailError> {
    let mut pdf = report.pdf;

    if pdf.len() > config.max_pdf_bytes {
        warn!("PDF is {:.2} MB, attempting recompression", megabytes(pdf.len()));
        pdf = compress_pdf(pdf).await;

        if pdf.len() > config.max_pdf_bytes {
            return Err(MailError::TooLarge {
                size_mb: megabytes(pdf.len()),
                limit_mb: megabytes(config.max_pdf_bytes),
            });
        }
    }

    let mail = OutgoingMail {
        to: report.email.trim().to_string(),
        subject: SUBJECT.to_string(),
        html: render_body(report.dataset.as_deref(), report.filters.as_ref()),
        attachment: pdf,
        attachment_name: ATTACHMENT_NAME.to_string(),
    };
    let destino = mail.to.clone();

    info!("Sending PDF report ({:.2} MB) to {}", megabytes(mail.attachment.len()), destino);
    let reply = transport.send(mail).await?;
    interpret_reply(&reply, &destino)
}

/// Decide whether the relay accepted the message
pub fn interpret_reply(raw: &str, destino: &str) -> Result<MailReceipt, MailError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MailError::NoResponse);
    }

    let reply: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return Err(MailError::Rejected(Value::String(raw.to_string()))),
    };

    let accepted = is_truthy(reply.get("correcto"))
        || is_truthy(reply.get("datos").and_then(|datos| datos.get("success")));

    if !accepted {
        return Err(MailError::Rejected(reply));
    }

    let datos = reply.get("datos");
    Ok(MailReceipt {
        thread_id: datos.and_then(|d| d.get("thread_id")).cloned(),
        estado: datos
            .and_then(|d| d.get("estado"))
            .and_then(Value::as_str)
            .unwrap_or("En cola")
            .to_string(),
        destino: destino.to_string(),
    })
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

/// HTML body listing the dataset and the non-empty filters
pub fn render_body(dataset: Option<&str>, filters: Option<&Value>) -> String {
    let mut html = String::from(
        "<h2>Gráficas Estadísticas</h2><p>Adjunto encontrarás el PDF con las gráficas solicitadas.</p>",
    );

    if let Some(dataset) = dataset.map(str::trim).filter(|d| !d.is_empty()) {
        html.push_str(&format!(
            "<p><strong>Dataset:</strong> {}</p>",
            html_escape::encode_text(dataset)
        ));
    }

    let items: Vec<String> = filters
        .and_then(Value::as_object)
        .map(|filters| {
            filters
                .iter()
                .filter(|(_, value)| is_truthy(Some(value)))
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    format!(
                        "<li>{}: {}</li>",
                        html_escape::encode_text(key),
                        html_escape::encode_text(&value)
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    if !items.is_empty() {
        html.push_str("<p><strong>Filtros aplicados:</strong></p><ul>");
        html.push_str(&items.concat());
        html.push_str("</ul>");
    }

    html.push_str("<br><p><em>Este es un correo automático, por favor no responder.</em></p>");
    html
}

/// Prune unused objects and deflate streams, keeping the result only if smaller
pub async fn compress_pdf(original: Vec<u8>) -> Vec<u8> {
    let input = original.clone();
    let compressed = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, lopdf::Error> {
        let mut document = lopdf::Document::load_mem(&input)?;
        document.prune_objects();
        document.renumber_objects();
        document.compress();
        let mut out = Vec::with_capacity(input.len());
        document.save_to(&mut out)?;
        Ok(out)
    })
    .await;

    match compressed {
        Ok(Ok(out)) if out.len() < original.len() => {
            info!(
                "PDF recompressed from {:.2} MB to {:.2} MB",
                megabytes(original.len()),
                megabytes(out.len())
            );
            out
        }
        Ok(Ok(_)) => original,
        Ok(Err(e)) => {
            warn!("PDF recompression failed: {}", e);
            original
        }
        Err(e) => {
            warn!("PDF recompression task failed: {}", e);
            original
        }
    }
}

fn megabytes(bytes: usize) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct CannedRelay {
        reply: String,
        sent: Mutex<Vec<OutgoingMail>>,
    }

    impl CannedRelay {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                sent: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl MailTransport for CannedRelay {
        async fn send(&self, mail: OutgoingMail) -> Result<String, MailError> {
            self.sent.lock().unwrap().push(mail);
            Ok(self.reply.clone())
        }
    }

    fn report(pdf: Vec<u8>) -> PdfReport {
        PdfReport {
            pdf,
            email: " admin@uaslp.mx ".into(),
            dataset: Some("users".into()),
            filters: Some(json!({"universidad_id": "3", "fecha_inicio": ""})),
        }
    }

    #[test]
    fn correcto_flag_means_queued() {
        let receipt = interpret_reply(r#"{"correcto": true}"#, "a@b.mx").unwrap();
        assert_eq!(receipt.estado, "En cola");
        assert_eq!(receipt.thread_id, None);
    }

    #[test]
    fn nested_success_carries_thread_and_state() {
        let raw = r#"{"datos": {"success": true, "thread_id": 991, "estado": "Enviado"}}"#;
        let receipt = interpret_reply(raw, "a@b.mx").unwrap();
        assert_eq!(receipt.thread_id, Some(json!(991)));
        assert_eq!(receipt.estado, "Enviado");
        assert_eq!(receipt.destino, "a@b.mx");
    }

    #[test]
    fn empty_or_negative_replies_fail() {
        assert!(matches!(interpret_reply("  ", "a@b.mx"), Err(MailError::NoResponse)));
        assert!(matches!(
            interpret_reply(r#"{"correcto": false, "error": "x"}"#, "a@b.mx"),
            Err(MailError::Rejected(_))
        ));
        assert!(matches!(
            interpret_reply("<html>500</html>", "a@b.mx"),
            Err(MailError::Rejected(Value::String(_)))
        ));
    }

    #[test]
    fn body_lists_only_non_empty_filters_escaped() {
        let html = render_body(
            Some("<users>"),
            Some(&json!({"carrera": "Ing. <Sistemas>", "beca_id": "", "facultad_id": null})),
        );
        assert!(html.contains("<p><strong>Dataset:</strong> &lt;users&gt;</p>"));
        assert!(html.contains("<li>carrera: Ing. &lt;Sistemas&gt;</li>"));
        assert!(!html.contains("beca_id"));
        assert!(!html.contains("facultad_id"));
    }

    #[test]
    fn body_without_filters_has_no_list() {
        let html = render_body(None, Some(&json!("not an object")));
        assert!(!html.contains("<ul>"));
        assert!(html.ends_with("por favor no responder.</em></p>"));
    }

    #[tokio::test]
    async fn small_pdf_is_sent_unchanged() {
        let relay = CannedRelay::new(r#"{"correcto": 1}"#);
        let config = MailConfig::default();
        let receipt = send_pdf_report(&relay, &config, report(b"%PDF-1.4 tiny".to_vec()))
            .await
            .unwrap();

        assert_eq!(receipt.destino, "admin@uaslp.mx");
        let sent = relay.sent.lock().unwrap();
        assert_eq!(sent[0].attachment, b"%PDF-1.4 tiny".to_vec());
        assert_eq!(sent[0].attachment_name, ATTACHMENT_NAME);
        assert_eq!(sent[0].subject, SUBJECT);
        assert!(sent[0].html.contains("<li>universidad_id: 3</li>"));
    }

    #[tokio::test]
    async fn oversized_unparseable_pdf_is_rejected() {
        let relay = CannedRelay::new(r#"{"correcto": true}"#);
        let config = MailConfig {
            max_pdf_bytes: 16,
            ..MailConfig::default()
        };
        let result = send_pdf_report(&relay, &config, report(vec![b'x'; 64])).await;
        assert!(matches!(result, Err(MailError::TooLarge { .. })));
        assert!(relay.sent.lock().unwrap().is_empty());
    }
}
