// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Generic domain event wrapper
//!
//! One event envelope used for every runtime event (§5's change
//! propagation): a unique id, an RFC3339 timestamp, and causation tracking
//! so a `StepOutputChanged` can point back at the `StepInputChanged` that
//! triggered it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent<T> {
    pub event_id: Uuid,
    pub payload: T,
    #[serde(with = "rfc3339")]
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    pub causation_id: Option<Uuid>,
}

impl<T> DomainEvent<T> {
    pub fn new(payload: T) -> Self {
        Self { event_id: Uuid::new_v4(), payload, occurred_at: chrono::Utc::now(), causation_id: None }
    }

    pub fn caused_by(mut self, causation_id: Uuid) -> Self {
        self.causation_id = Some(causation_id);
        self
    }

    pub fn was_caused_by(&self, other_event_id: Uuid) -> bool {
        self.causation_id == Some(other_event_id)
    }
}

mod rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
