//! `/time`: the current time, formatted the way the user asked.
//!
//! The model only chooses a format spec (as JSON); the time itself always
//! comes from the local clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::debug;

use crate::error::SkillError;
use crate::skill::{Skill, SkillContext};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimeFormat {
    pub date_fmt: String,
    /// `"12h"` or `"24h"`.
    pub hour_fmt: String,
    pub seconds: bool,
    pub ampm: bool,
}

impl Default for TimeFormat {
    fn default() -> Self {
        Self {
            date_fmt: "DD/MM/YYYY".to_string(),
            hour_fmt: "12h".to_string(),
            seconds: false,
            ampm: true,
        }
    }
}

impl TimeFormat {
    /// Used when the model's reply is not a JSON object.
    pub fn fallback() -> Self {
        Self {
            seconds: true,
            ..Self::default()
        }
    }

    /// Parse the model's reply, tolerating a surrounding code fence.
    pub fn from_model_reply(raw: &str) -> Self {
        let trimmed = raw
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();
        serde_json::from_str::<TimeFormat>(trimmed).unwrap_or_else(|_| Self::fallback())
    }

    pub fn render(&self, now: &DateTime<Tz>) -> String {
        let date = now.format("%d/%m/%Y");
        if self.hour_fmt == "24h" {
            let time = now.format(if self.seconds { "%H:%M:%S" } else { "%H:%M" });
            return format!("{} {}", date, time);
        }

        let pattern = match (self.seconds, self.ampm) {
            (true, true) => "%I:%M:%S %p",
            (true, false) => "%I:%M:%S",
            (false, true) => "%I:%M %p",
            (false, false) => "%I:%M",
        };
        let time = now.format(pattern).to_string();
        format!("{} {}", date, time.trim_start_matches('0'))
    }
}

fn format_prompt(user_text: &str) -> String {
    format!(
        "You are a strict formatter router for a time tool.\n\
         Return ONLY a JSON object (no backticks, no explanation) with keys:\n  \
         date_fmt: must be \"DD/MM/YYYY\"\n  \
         hour_fmt: \"12h\" or \"24h\"\n  \
         seconds: true/false\n  \
         ampm: true/false\n\n\
         User request:\n{}\n\nJSON:",
        user_text
    )
}

pub struct TimeSkill {
    timezone: Tz,
}

impl TimeSkill {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

#[async_trait]
impl Skill for TimeSkill {
    fn command(&self) -> &str {
        "/time"
    }

    fn description(&self) -> &str {
        "Show the current date and time"
    }

    async fn run(&self, arg: &str, ctx: &SkillContext) -> Result<String, SkillError> {
        let user_text = match arg.trim() {
            "" => "what is the time right now",
            text => text,
        };

        let spec = match ctx.llm.prompt(&format_prompt(user_text)).await {
            Ok(raw) => TimeFormat::from_model_reply(&raw),
            Err(e) => {
                debug!(error = %e, "Time format model call failed; using fallback format");
                TimeFormat::fallback()
            }
        };

        let now = Utc::now().with_timezone(&self.timezone);
        Ok(spec.render(&now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::context;
    use chrono::TimeZone;
    use jarvis_llm::MockLanguageModel;
    use std::sync::Arc;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Tz> {
        chrono_tz::Asia::Karachi
            .with_ymd_and_hms(2025, 3, 7, h, m, s)
            .single()
            .unwrap()
    }

    #[test]
    fn test_parse_spec_and_fallback() {
        let spec = TimeFormat::from_model_reply(
            r#"{"date_fmt":"DD/MM/YYYY","hour_fmt":"24h","seconds":false,"ampm":false}"#,
        );
        assert_eq!(spec.hour_fmt, "24h");
        assert!(!spec.seconds);

        assert_eq!(TimeFormat::from_model_reply("sure! 24 hour"), TimeFormat::fallback());
        assert_eq!(TimeFormat::from_model_reply("[1,2]"), TimeFormat::fallback());
    }

    #[test]
    fn test_parse_spec_in_code_fence_with_missing_keys() {
        let spec = TimeFormat::from_model_reply("```json\n{\"hour_fmt\": \"24h\"}\n```");
        assert_eq!(spec.hour_fmt, "24h");
        assert_eq!(spec.date_fmt, "DD/MM/YYYY");
        assert!(spec.ampm);
    }

    #[test]
    fn test_render_variants() {
        let now = at(9, 5, 7);
        assert_eq!(TimeFormat::fallback().render(&now), "07/03/2025 9:05:07 AM");
        assert_eq!(TimeFormat::default().render(&now), "07/03/2025 9:05 AM");

        let h24 = TimeFormat {
            hour_fmt: "24h".to_string(),
            seconds: true,
            ..TimeFormat::default()
        };
        assert_eq!(h24.render(&at(21, 5, 7)), "07/03/2025 21:05:07");

        let no_ampm = TimeFormat {
            ampm: false,
            ..TimeFormat::default()
        };
        assert_eq!(no_ampm.render(&at(21, 5, 7)), "07/03/2025 9:05");
        assert_eq!(TimeFormat::default().render(&at(12, 30, 0)), "07/03/2025 12:30 PM");
    }

    #[tokio::test]
    async fn test_time_skill_uses_model_spec() {
        let llm = Arc::new(MockLanguageModel::scripted([r#"{"hour_fmt":"24h"}"#]));
        let ctx = context("/time", Arc::clone(&llm));
        let out = TimeSkill::new(chrono_tz::UTC).run("", &ctx).await.unwrap();
        assert!(!out.contains("M"), "24h output has no AM/PM: {out}");
        assert!(llm.last_prompt().unwrap().contains("what is the time right now"));
    }

    #[tokio::test]
    async fn test_time_skill_model_failure_falls_back() {
        let ctx = context("/time", Arc::new(MockLanguageModel::failing("offline")));
        let out = TimeSkill::new(chrono_tz::UTC).run("time please", &ctx).await.unwrap();
        assert!(out.ends_with("AM") || out.ends_with("PM"));
    }
}
