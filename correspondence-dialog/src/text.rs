//! Activity description texts in Norwegian Bokmål, Nynorsk and English.

use crate::error::{DialogError, DialogResult};
use crate::types::LocalizedValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextType {
    NotificationOrderCreated,
    NotificationOrderCancelled,
    /// Tokens: destination address, channel.
    NotificationSent,
    /// Tokens: destination address, channel.
    NotificationReminderSent,
    /// Tokens: attachment file name.
    DownloadStarted,
    CorrespondencePublished,
    CorrespondenceConfirmed,
    CorrespondenceArchived,
    CorrespondencePurged,
    /// Tokens: forwarding party, email address, optional note.
    ForwardedToEmail,
    /// Tokens: forwarding party, mailbox supplier, optional note.
    ForwardedToMailboxSupplier,
    /// Tokens: forwarding party, receiving user, optional note.
    ForwardedToUser,
}

impl TextType {
    /// Number of tokens that must be present.
    pub fn required_tokens(self) -> usize {
        match self {
            Self::NotificationSent
            | Self::NotificationReminderSent
            | Self::ForwardedToEmail
            | Self::ForwardedToMailboxSupplier
            | Self::ForwardedToUser => 2,
            Self::DownloadStarted => 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Nb,
    Nn,
    En,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Nb, Language::Nn, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Self::Nb => "nb",
            Self::Nn => "nn",
            Self::En => "en",
        }
    }
}

/// Renders one text. Fails when fewer tokens than required are given.
pub fn render(text_type: TextType, language: Language, tokens: &[&str]) -> DialogResult<String> {
    let required = text_type.required_tokens();
    if tokens.len() < required {
        return Err(DialogError::Validation(format!(
            "{text_type:?} expects {required} token(s), got {}",
            tokens.len()
        )));
    }
    let token = |i: usize| tokens.get(i).copied().unwrap_or_default();
    let note = tokens.get(2).map(|n| n.trim()).filter(|n| !n.is_empty());
    let en = language == Language::En;

    let rendered = match text_type {
        TextType::NotificationOrderCreated if en => "Notification order created.".to_string(),
        TextType::NotificationOrderCreated => "Varslingsordre opprettet.".to_string(),
        TextType::NotificationOrderCancelled if en => "Notification order cancelled.".to_string(),
        TextType::NotificationOrderCancelled => "Varslingsordre kansellert.".to_string(),
        TextType::NotificationSent | TextType::NotificationReminderSent => {
            let channel = normalize_channel(token(1), language);
            let reminder = text_type == TextType::NotificationReminderSent;
            match (en, reminder) {
                (true, false) => format!(
                    "Notification about received message sent to {} on {channel}.",
                    token(0)
                ),
                (true, true) => format!(
                    "Reminder notification about received message sent to {} on {channel}.",
                    token(0)
                ),
                (false, false) => {
                    format!("Varsel om mottatt melding sendt til {} på {channel}.", token(0))
                }
                (false, true) => {
                    format!("Revarsel om mottatt melding sendt til {} på {channel}.", token(0))
                }
            }
        }
        TextType::DownloadStarted if en => format!("Started downloading attachment {}", token(0)),
        TextType::DownloadStarted => format!("Startet nedlastning av vedlegg {}", token(0)),
        TextType::CorrespondencePublished if en => "Message published.".to_string(),
        TextType::CorrespondencePublished => "Melding publisert.".to_string(),
        TextType::CorrespondenceConfirmed if en => "Message confirmed.".to_string(),
        TextType::CorrespondenceConfirmed => "Melding bekreftet.".to_string(),
        TextType::CorrespondenceArchived if en => "Message archived.".to_string(),
        TextType::CorrespondenceArchived => "Melding arkivert.".to_string(),
        TextType::CorrespondencePurged if en => "Message deleted.".to_string(),
        TextType::CorrespondencePurged => "Melding slettet.".to_string(),
        TextType::ForwardedToEmail | TextType::ForwardedToMailboxSupplier | TextType::ForwardedToUser => {
            let mut text = match (text_type, en) {
                (TextType::ForwardedToEmail, true) => format!("forwarded {} to {}", token(0), token(1)),
                (TextType::ForwardedToEmail, false) => {
                    format!("videresendte {} til {}", token(0), token(1))
                }
                (TextType::ForwardedToUser, true) => format!("shared {} with {}", token(0), token(1)),
                (TextType::ForwardedToUser, false) => format!("delte {} med {}", token(0), token(1)),
                (_, true) => format!("sent {} to mailbox supplier {}", token(0), token(1)),
                (_, false) => format!("sendte {} til postkasseleverandør {}", token(0), token(1)),
            };
            if let Some(note) = note {
                text.push_str(&if en {
                    format!(" with note: {note}")
                } else {
                    format!(" og skrev: {note}")
                });
            }
            text
        }
    };
    Ok(rendered)
}

/// The nb/nn/en description list of an information activity.
pub fn descriptions(text_type: TextType, tokens: &[&str]) -> DialogResult<Vec<LocalizedValue>> {
    Language::ALL
        .iter()
        .map(|&lang| Ok(LocalizedValue::new(lang.code(), render(text_type, lang, tokens)?)))
        .collect()
}

/// Maps channel spellings onto the display name for `language`. Unknown
/// channels pass through.
fn normalize_channel(channel: &str, language: Language) -> String {
    let lower = channel.trim().to_ascii_lowercase();
    match lower.as_str() {
        "email" | "e-post" | "epost" if language == Language::En => "Email".to_string(),
        "email" | "e-post" | "epost" => "e-post".to_string(),
        "sms" => "SMS".to_string(),
        _ => channel.to_string(),
    }
}
