// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use tracing::info;

use crate::model::{BroadcastAudience, User, UserStatus};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 2000;

impl BroadcastAudience {
    pub fn includes(self, user: &User) -> bool {
        match self {
            Self::All => true,
            Self::Active => user.status == UserStatus::Active,
            Self::Paid => user.total_orders > 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastField {
    #[default]
    Title,
    Message,
    Audience,
    SendEmail,
    SendSms,
}

impl BroadcastField {
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::Message,
        Self::Audience,
        Self::SendEmail,
        Self::SendSms,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Message => "message",
            Self::Audience => "audience",
            Self::SendEmail => "email",
            Self::SendSms => "sms",
        }
    }

    pub fn next(self) -> Self {
        let position = Self::ALL.iter().position(|field| *field == self).unwrap_or(0);
        Self::ALL[(position + 1) % Self::ALL.len()]
    }

    pub fn is_text(self) -> bool {
        matches!(self, Self::Title | Self::Message)
    }
}

/// Announcement to users. Submission only validates and counts recipients;
/// delivery happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastForm {
    pub title: String,
    pub message: String,
    pub audience: BroadcastAudience,
    pub send_email: bool,
    pub send_sms: bool,
}

impl Default for BroadcastForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            message: String::new(),
            audience: BroadcastAudience::All,
            send_email: true,
            send_sms: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReceipt {
    pub title: String,
    pub audience: BroadcastAudience,
    pub recipients: usize,
    pub channels: Vec<&'static str>,
}

impl BroadcastReceipt {
    pub fn summary(&self) -> String {
        format!(
            "broadcast sent to {} {} via {}",
            self.recipients,
            if self.recipients == 1 { "user" } else { "users" },
            self.channels.join(" + ")
        )
    }
}

impl BroadcastForm {
    pub fn validate(&self) -> Result<()> {
        let title = self.title.chars().count();
        if title < TITLE_MIN_CHARS {
            bail!("broadcast title needs at least {TITLE_MIN_CHARS} characters -- extend the title and retry");
        }
        if title > TITLE_MAX_CHARS {
            bail!("broadcast title is limited to {TITLE_MAX_CHARS} characters -- shorten the title and retry");
        }
        let message = self.message.chars().count();
        if message < MESSAGE_MIN_CHARS {
            bail!("broadcast message needs at least {MESSAGE_MIN_CHARS} characters -- extend the message and retry");
        }
        if message > MESSAGE_MAX_CHARS {
            bail!("broadcast message is limited to {MESSAGE_MAX_CHARS} characters -- shorten the message and retry");
        }
        if !self.send_email && !self.send_sms {
            bail!("broadcast needs a delivery channel -- enable email or sms and retry");
        }
        Ok(())
    }

    pub fn channels(&self) -> Vec<&'static str> {
        let mut channels = Vec::with_capacity(2);
        if self.send_email {
            channels.push("email");
        }
        if self.send_sms {
            channels.push("sms");
        }
        channels
    }

    pub fn cycle_audience(&mut self) {
        let all = BroadcastAudience::ALL;
        let position = all.iter().position(|audience| *audience == self.audience).unwrap_or(0);
        self.audience = all[(position + 1) % all.len()];
    }

    /// Validates, counts recipients among `users`, then clears title and
    /// message. Audience and channels carry over to the next broadcast.
    pub fn submit(&mut self, users: &[User]) -> Result<BroadcastReceipt> {
        self.validate()?;
        let recipients = users
            .iter()
            .filter(|user| self.audience.includes(user))
            .count();
        let receipt = BroadcastReceipt {
            title: std::mem::take(&mut self.title),
            audience: self.audience,
            recipients,
            channels: self.channels(),
        };
        self.message.clear();
        info!(
            title = %receipt.title,
            audience = receipt.audience.as_str(),
            recipients,
            channels = ?receipt.channels,
            "broadcast submitted"
        );
        Ok(receipt)
    }
}
