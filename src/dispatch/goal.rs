use crate::odds::{Source, Sport};

/// Task text sent to the remote browser agent for one sportsbook.
///
/// Asks for exactly one JSON object with the fields the result cards read
/// (`date`, `time`, `home_team`, `away_team`, `betting_odds.{home_wins,draw,away_wins}`)
/// and for the pre-match listing rather than a live one.
pub fn build_goal(sport: Sport, match_name: &str, source: &Source) -> String {
    let match_name = match_name.trim();
    format!(
        "Find the betting odds for the {sport} match \"{match_name}\" on {name} ({url}).\n\
         Look for the upcoming, pre-match listing of this match. Prefer pre-match or upcoming odds \
         over live or in-progress markets; only use a live listing if no pre-match one exists.\n\
         Return a single JSON object and nothing else, in exactly this shape:\n\
         {{\"date\": \"...\", \"time\": \"...\", \"home_team\": \"...\", \"away_team\": \"...\", \
         \"betting_odds\": {{\"home_wins\": \"...\", \"draw\": \"...\", \"away_wins\": \"...\"}}}}\n\
         Copy the odds exactly as the site lists them. If there is no draw market, set \"draw\" to null.\n\
         If the match cannot be found, return {{\"error\": \"Match not found\", \"reason\": \"<short explanation>\"}}.",
        sport = sport.id(),
        name = source.name,
        url = source.endpoint,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_embeds_match_source_and_shape() {
        let src = Source::new("FanDuel", "https://sportsbook.fanduel.com");
        let g = build_goal(Sport::Soccer, "  Man United vs. Chelsea ", &src);
        assert!(g.contains("\"Man United vs. Chelsea\""));
        assert!(g.contains("soccer"));
        assert!(g.contains("https://sportsbook.fanduel.com"));
        for field in ["date", "time", "home_team", "away_team", "home_wins", "draw", "away_wins"] {
            assert!(g.contains(&format!("\"{field}\"")), "missing {field}");
        }
        assert!(g.contains("pre-match"));
        assert!(g.contains("\"error\""));
    }
}
