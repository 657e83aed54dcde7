use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// gamertag, kills, revives, then at least one more number (the score column)
    static ref SCORE_LINE: Regex =
        Regex::new(r"^(.+?)\s+(\d+)\s+(\d+)\s+\d+").expect("score line pattern is valid");
}

/// One scoreboard row read from a screenshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub gamertag: String,
    pub kills: u32,
    pub revives: u32,
}

/// Parse one transcript line; `None` when it is not a player row
pub fn parse_line(line: &str) -> Option<ScoreLine> {
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    let captures = SCORE_LINE.captures(&collapsed)?;

    let gamertag = captures.get(1)?.as_str().trim().to_string();
    let kills = captures.get(2)?.as_str().parse().ok()?;
    let revives = captures.get(3)?.as_str().parse().ok()?;

    Some(ScoreLine {
        gamertag,
        kills,
        revives,
    })
}

/// Every player row of a transcript, in order
pub fn parse_text(text: &str) -> Vec<ScoreLine> {
    text.lines().filter_map(parse_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(gamertag: &str, kills: u32, revives: u32) -> ScoreLine {
        ScoreLine {
            gamertag: gamertag.to_string(),
            kills,
            revives,
        }
    }

    #[test]
    fn reads_a_plain_row() {
        assert_eq!(parse_line("Ghost 12 3 1450"), Some(row("Ghost", 12, 3)));
    }

    #[test]
    fn gamertags_may_contain_spaces_and_tags() {
        assert_eq!(
            parse_line("  The   Night  Owl#2231    7   0  820   4"),
            Some(row("The Night Owl#2231", 7, 0))
        );
    }

    #[test]
    fn short_lines_are_ignored() {
        assert_eq!(parse_line("Ghost 12 3"), None);
        assert_eq!(parse_line("Ghost"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("KILLS REVIVES SCORE"), None);
    }

    #[test]
    fn overflowing_counters_are_ignored() {
        assert_eq!(parse_line("Ghost 99999999999 3 10"), None);
    }

    #[test]
    fn parses_a_noisy_transcript() {
        let text = "\
SQUAD STANDINGS
Ghost 12 3 1450
 bravo_six   4  1  600 2
NAME KILLS REVIVES SCORE

xX Soap Xx 0 2 150
";
        assert_eq!(
            parse_text(text),
            vec![row("Ghost", 12, 3), row("bravo_six", 4, 1), row("xX Soap Xx", 0, 2)]
        );
    }
}
