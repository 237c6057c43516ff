use std::fmt::Write;

use super::GameCard;
use crate::db::models::{Season, Week};

const CORRECT_ICON: &str = "checkmark-16.png";
const INCORRECT_ICON: &str = "delete-2-16.png";

/// `<option>` elements for the season dropdown, newest season first.
pub fn season_options(seasons: &[Season]) -> String {
    let mut html = String::new();
    for s in seasons.iter().rev() {
        let name = escape(&s.season);
        let _ = write!(html, r#"<option value="{0}">{0}</option>"#, name);
    }
    html
}

/// `<option>` elements for every week, regular season then playoffs.
pub fn week_options() -> String {
    let mut html = String::new();
    for week in Week::all() {
        let _ = write!(html, r#"<option value="{0}">{0}</option>"#, week);
    }
    html
}

/// Page header: `"Week 3 - 2022-2023"`, `"SuperBowl - 2022-2023"`, or
/// without the season on the upcoming page.
pub fn week_header(week: Week, season: Option<&str>) -> String {
    let head = match week {
        Week::Regular(n) => format!("Week {}", n),
        playoff => playoff.to_string(),
    };
    match season {
        Some(s) => format!("{} - {}", head, s),
        None => head,
    }
}

/// One `game_card` block per card.
pub fn render_cards(cards: &[GameCard]) -> String {
    let mut html = String::new();
    for card in cards {
        let icon = match card.prediction.outcome_correct {
            Some(true) => format!(r#"<img src="/assets/{}" class="result">"#, CORRECT_ICON),
            Some(false) => format!(r#"<img src="/assets/{}" class="result">"#, INCORRECT_ICON),
            None => String::new(),
        };
        let _ = write!(
            html,
            r#"<div class="game_card">
    <div class="card_container">
        <h4 class="team_name1"><b>{home}</b></h4>
        <h4 class="score1"><b>{home_pts}</b></h4>
        <h4 class="elo1"><b>{home_label}</b></h4>
        {icon}
        <h4 class="team_name2"><b>{away}</b></h4>
        <h4 class="score2"><b>{away_pts}</b></h4>
        <h4 class="elo2"><b>{away_label}</b></h4>
    </div>
</div>
"#,
            home = escape(&card.home_team),
            home_pts = points(card.home_points),
            home_label = card.prediction.home_spread_label,
            icon = icon,
            away = escape(&card.away_team),
            away_pts = points(card.away_points),
            away_label = card.prediction.away_spread_label,
        );
    }
    html
}

fn points(p: Option<i32>) -> String {
    p.map(|p| p.to_string()).unwrap_or_default()
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
