//! Prompt text for the market analysis.

use crate::models::MarketData;

/// Persona sent as the system message.
pub const SYSTEM_PROMPT: &str = "You're a sharp market analyst with a touch of sarcasm. \
Your wit comes from seeing patterns clearly and stating them confidently, not from jokes or analogies. \
You explain what happened and why. When markets do something that doesn't track with the news or \
fundamentals, you point it out plainly. You write with authority - the kind of analyst whose weekly \
notes people actually read because the observations are precise and occasionally cutting in their \
clarity, with a tone that doesn't take yourself too seriously.";

const INTRO: &str = "Analyze today's market data. Be sharp and direct. \
Context matters - use the news to explain movements when relevant.";

const FORMAT_INSTRUCTIONS: &str = r#"Format:

**TODAY'S HEADLINE**
One sharp sentence with a laid back tone. If there's a clear catalyst in the news, reference it. Do not be overly vague.

**TRADITIONAL MARKETS**
What happened, why it matters, what's driving it. Reference news if it explains the move. Strong language when appropriate. 3-4 sentences.

**CRYPTO MARKETS**
Same approach. If crypto is ignoring traditional market signals or news, point that out. 3-4 sentences.

**THE SPLIT**
How these markets are relating. If one is paying attention to reality and the other isn't, say so. 2-3 sentences.

**TOMORROW'S TELLS**
Specific things to watch based on today's pattern.

Voice guidelines:
- Sharp observations over decoration, with a touch of dry wit
- Confident and direct
- When something is obvious, state it plainly (that itself can be witty)
- Use precise language - call things what they are
- If markets are doing something irrational, you can note that
- Do not force being clever or funny - it should come naturally from the analysis
- Most sentences: straight analysis. Occasional sentence: makes someone nod and think "exactly."
- If a section's data is missing, say so in one clause and move on; never invent numbers"#;

/// Build the user prompt embedding every collector's output as JSON.
pub fn build_prompt(data: &MarketData) -> serde_json::Result<String> {
    let tradfi = serde_json::to_string_pretty(&data.tradfi)?;
    let crypto = serde_json::to_string_pretty(&data.crypto)?;
    let onchain = serde_json::to_string_pretty(&data.onchain)?;
    let news = serde_json::to_string_pretty(&data.news)?;

    Ok(format!(
        "{INTRO}\n\n\
         TRADITIONAL MARKETS:\n{tradfi}\n\n\
         CRYPTO MARKETS:\n{crypto}\n\n\
         ON-CHAIN DATA:\n{onchain}\n\n\
         RECENT NEWS (use this to explain market movements):\n{news}\n\n\
         {FORMAT_INSTRUCTIONS}\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CryptoSnapshot, Direction, MarketPoint, OnChainSummary, TradFiSnapshot,
    };
    use chrono::{Local, TimeZone};

    fn sample_data() -> MarketData {
        MarketData {
            tradfi: TradFiSnapshot {
                points: vec![MarketPoint {
                    name: "S&P 500".to_string(),
                    symbol: "^GSPC".to_string(),
                    price: 5825.23,
                    change_percent: -1.2,
                    direction: Direction::Down,
                }],
            },
            crypto: CryptoSnapshot::default(),
            onchain: OnChainSummary::empty(Local.with_ymd_and_hms(2024, 3, 7, 8, 0, 0).unwrap()),
            news: vec![],
        }
    }

    #[test]
    fn test_prompt_embeds_all_sections() {
        let prompt = build_prompt(&sample_data()).unwrap();

        assert!(prompt.starts_with("Analyze today's market data."));
        assert!(prompt.contains("TRADITIONAL MARKETS:\n["));
        assert!(prompt.contains("\"S&P 500\""));
        assert!(prompt.contains("CRYPTO MARKETS:\n{"));
        assert!(prompt.contains("\"global\": null"));
        assert!(prompt.contains("\"collected_at\": \"2024-03-07 08:00:00\""));
        assert!(prompt.contains("RECENT NEWS (use this to explain market movements):\n[]"));
        assert!(prompt.contains("**TOMORROW'S TELLS**"));
    }

    #[test]
    fn test_prompt_with_empty_sources() {
        let mut data = sample_data();
        data.tradfi = TradFiSnapshot::default();

        let prompt = build_prompt(&data).unwrap();
        assert!(prompt.contains("TRADITIONAL MARKETS:\n[]"));
        assert!(prompt.contains("\"eth_price\": null"));
    }
}
