use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub read: RateLimitRule,
    pub submit: RateLimitRule,
    pub review: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            read: RateLimitRule::new(30, 60),
            submit: RateLimitRule::new(5, 10),
            review: RateLimitRule::new(10, 20),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.enabled = parse_bool_env("RATE_LIMIT_ENABLED", cfg.enabled);

        if let Ok(raw) = env::var("RATE_LIMIT_CONFIG") {
            match parse_rate_limit_config(&raw) {
                Ok(parsed) => cfg = cfg.apply_partial(parsed),
                Err(err) => {
                    tracing::warn!("Invalid RATE_LIMIT_CONFIG '{}': {}", raw, err);
                }
            }
        }

        cfg
    }

    fn apply_partial(mut self, parsed: PartialRateLimitConfig) -> Self {
        if let Some(rule) = parsed.global {
            self.read = rule;
            self.submit = rule;
            self.review = rule;
        }
        if let Some(rule) = parsed.read {
            self.read = rule;
        }
        if let Some(rule) = parsed.submit {
            self.submit = rule;
        }
        if let Some(rule) = parsed.review {
            self.review = rule;
        }
        self
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PartialRateLimitConfig {
    global: Option<RateLimitRule>,
    read: Option<RateLimitRule>,
    submit: Option<RateLimitRule>,
    review: Option<RateLimitRule>,
}

fn parse_bool_env(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn parse_rate_limit_config(raw: &str) -> Result<PartialRateLimitConfig, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }

    // Global format: "10:20" -> apply to all groups.
    if !trimmed.contains('=') {
        let rule = parse_rule(trimmed)?;
        return Ok(PartialRateLimitConfig {
            global: Some(rule),
            ..Default::default()
        });
    }

    // Grouped format: "read=30:60,submit=5:10,review=10:20"
    let mut parsed = PartialRateLimitConfig::default();
    for item in trimmed.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (name, raw_rule) = item
            .split_once('=')
            .ok_or_else(|| format!("invalid item '{}', expected name=per:burst", item))?;
        let rule = parse_rule(raw_rule.trim())?;
        match name.trim().to_ascii_lowercase().as_str() {
            "read" => parsed.read = Some(rule),
            "submit" => parsed.submit = Some(rule),
            "review" => parsed.review = Some(rule),
            other => {
                return Err(format!(
                    "unknown group '{}', expected read/submit/review",
                    other
                ));
            }
        }
    }

    Ok(parsed)
}

fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second_raw, burst_raw) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw))?;

    let per_second: u64 = per_second_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second_raw.trim()))?;
    let burst_size: u32 = burst_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst_raw.trim()))?;

    if per_second == 0 {
        return Err("per_second must be > 0".to_string());
    }
    if burst_size == 0 {
        return Err("burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule::new(per_second, burst_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_global_rule() {
        let parsed = parse_rate_limit_config("12:24").unwrap();
        assert_eq!(parsed.global, Some(RateLimitRule::new(12, 24)));
        assert_eq!(parsed.read, None);
    }

    #[test]
    fn parse_grouped_rules() {
        let parsed = parse_rate_limit_config("read=1:2,submit=3:4,review=5:6").unwrap();
        assert_eq!(parsed.read, Some(RateLimitRule::new(1, 2)));
        assert_eq!(parsed.submit, Some(RateLimitRule::new(3, 4)));
        assert_eq!(parsed.review, Some(RateLimitRule::new(5, 6)));
    }

    #[test]
    fn parse_unknown_group() {
        let err = parse_rate_limit_config("admin=8:16").unwrap_err();
        assert!(err.contains("unknown group"));
    }

    #[test]
    fn parse_invalid_rule() {
        let err = parse_rate_limit_config("read=abc").unwrap_err();
        assert!(err.contains("invalid rule"));
    }

    #[test]
    fn parse_zero_rates_rejected() {
        assert!(parse_rate_limit_config("0:5").is_err());
        assert!(parse_rate_limit_config("5:0").is_err());
    }
}
