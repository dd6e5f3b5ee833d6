use crate::catalog::MessageLexicon;
use crate::document::Intent;
use crate::extract::{Extract, ExtractionResult, NormalizedFields, now_rfc3339};
use mailparse::{MailAddr, MailHeaderMap, ParsedMail, addrparse, parse_mail};
use regex::Regex;
use scraper::Html;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Low,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Angry,
    Threatening,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sender {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageMetadata {
    pub sender: Sender,
    pub subject: String,
    pub timestamp: String,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageContent {
    pub intent: Intent,
    pub tone: Tone,
    pub body: String,
    pub key_points: Vec<String>,
    pub action_items: Vec<String>,
}

/// CRM-style record extracted from a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageFields {
    pub metadata: MessageMetadata,
    pub content: MessageContent,
}

/// Parses message headers and body, then derives urgency, tone, a coarse
/// intent, key points and action items from keyword tables.
#[derive(Debug, Clone)]
pub struct MessageExtractor {
    lexicon: MessageLexicon,
}

impl MessageExtractor {
    pub fn new(lexicon: MessageLexicon) -> Self {
        Self { lexicon }
    }

    fn try_extract(&self, bytes: &[u8]) -> Result<MessageFields, String> {
        let text = std::str::from_utf8(bytes)
            .map_err(|error| format!("invalid UTF-8 input: {error}"))?;
        let mail = parse_mail(text.as_bytes())
            .map_err(|error| format!("failed to parse message: {error}"))?;

        let sender = parse_sender(&mail.headers.get_first_value("From").unwrap_or_default());
        let subject = mail.headers.get_first_value("Subject").unwrap_or_default();
        let timestamp = mail
            .headers
            .get_first_value("Date")
            .unwrap_or_else(now_rfc3339);
        let body = message_body(&mail)?;

        let scanned = format!("{subject} {body}").to_lowercase();
        let sentence_split =
            Regex::new(r"[.!?]+").map_err(|error| format!("invalid sentence pattern: {error}"))?;

        Ok(MessageFields {
            metadata: MessageMetadata {
                sender,
                subject,
                timestamp,
                urgency: self.urgency(&scanned),
            },
            content: MessageContent {
                intent: self.intent(&scanned),
                tone: self.tone(&scanned),
                key_points: sentences_with(&sentence_split, &body, self.lexicon.key_point_markers),
                action_items: sentences_with(
                    &sentence_split,
                    &body,
                    self.lexicon.action_item_markers,
                ),
                body,
            },
        })
    }

    /// First matching tier wins: high, then medium, then low.
    pub fn urgency(&self, lowered: &str) -> Urgency {
        let tiers = [
            (Urgency::High, self.lexicon.urgency_high),
            (Urgency::Medium, self.lexicon.urgency_medium),
            (Urgency::Low, self.lexicon.urgency_low),
        ];
        tiers
            .into_iter()
            .find(|(_, keywords)| contains_any(lowered, keywords))
            .map_or(Urgency::Normal, |(level, _)| level)
    }

    pub fn intent(&self, lowered: &str) -> Intent {
        self.lexicon
            .intent_rules
            .iter()
            .find(|(_, keywords)| contains_any(lowered, keywords))
            .map_or(Intent::General, |(intent, _)| *intent)
    }

    pub fn tone(&self, lowered: &str) -> Tone {
        if contains_any(lowered, self.lexicon.tone_threatening) {
            Tone::Threatening
        } else if contains_any(lowered, self.lexicon.tone_angry) {
            Tone::Angry
        } else {
            Tone::Neutral
        }
    }
}

impl Extract for MessageExtractor {
    fn extract(&self, bytes: &[u8], _intent: Intent) -> ExtractionResult {
        match self.try_extract(bytes) {
            Ok(fields) => ExtractionResult::succeeded(
                NormalizedFields::Message(fields),
                Vec::new(),
                Vec::new(),
            ),
            Err(error) => {
                tracing::warn!(%error, "message extraction failed");
                ExtractionResult::failed(error)
            }
        }
    }
}

fn contains_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

/// Display name and address; the name falls back to the address local part.
fn parse_sender(from: &str) -> Sender {
    let (name, email) = match addrparse(from) {
        Ok(addresses) => match addresses.iter().next() {
            Some(MailAddr::Single(info)) => {
                (info.display_name.clone().unwrap_or_default(), info.addr.clone())
            }
            Some(MailAddr::Group(group)) => group
                .addrs
                .first()
                .map(|info| (info.display_name.clone().unwrap_or_default(), info.addr.clone()))
                .unwrap_or_default(),
            None => (String::new(), String::new()),
        },
        Err(_) => (String::new(), String::new()),
    };

    let name = if name.is_empty() {
        email.split('@').next().unwrap_or_default().to_owned()
    } else {
        name
    };
    Sender { name, email }
}

/// Plain-text part when present, otherwise the tag-stripped HTML part.
fn message_body(mail: &ParsedMail<'_>) -> Result<String, String> {
    let body = if mail.subparts.is_empty() {
        let raw = decoded_body(mail)?;
        if mail.ctype.mimetype == "text/html" {
            strip_markup(&raw)
        } else {
            raw
        }
    } else if let Some(plain) = find_part(mail, "text/plain") {
        decoded_body(plain)?
    } else if let Some(html) = find_part(mail, "text/html") {
        strip_markup(&decoded_body(html)?)
    } else {
        String::new()
    };
    Ok(body.trim().to_owned())
}

fn decoded_body(part: &ParsedMail<'_>) -> Result<String, String> {
    part.get_body()
        .map_err(|error| format!("failed to decode message body: {error}"))
}

fn find_part<'m, 'a>(mail: &'m ParsedMail<'a>, mimetype: &str) -> Option<&'m ParsedMail<'a>> {
    if mail.subparts.is_empty() {
        return (mail.ctype.mimetype == mimetype).then_some(mail);
    }
    mail.subparts.iter().find_map(|part| find_part(part, mimetype))
}

fn strip_markup(html: &str) -> String {
    Html::parse_document(html).root_element().text().collect()
}

/// Trimmed sentences (split on runs of `.`, `!`, `?`) containing any marker.
fn sentences_with(split: &Regex, body: &str, markers: &[&str]) -> Vec<String> {
    split
        .split(body)
        .map(str::trim)
        .filter(|sentence| {
            let lowered = sentence.to_lowercase();
            markers.iter().any(|marker| lowered.contains(marker))
        })
        .map(str::to_owned)
        .collect()
}
