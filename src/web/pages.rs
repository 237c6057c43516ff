//! Embedded single-file pages (HTML + CSS + JS).
//!
//! The scripts only fetch and place server-rendered fragments; all card
//! markup and spread labels come from the `/api` endpoints.

macro_rules! page {
    ($title:literal, $body:literal, $script:literal) => {
        concat!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>"#,
            $title,
            r#"</title>
<style>
  :root { --bg: #0f1117; --card: #1a1d27; --border: #2a2d3a; --accent: #6c63ff; --text: #e0e0e0; --muted: #8888aa; }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1.5rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  header a { color: var(--muted); text-decoration: none; }
  header a:hover { color: var(--accent); }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  .controls { display: flex; gap: 1rem; align-items: center; flex-wrap: wrap; }
  select { background: var(--card); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: .3rem .6rem; }
  #week_header { font-size: 1.2rem; }
  #summary { color: var(--muted); font-size: .85rem; }
  #game_cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1rem; }
  .game_card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1rem; }
  .card_container { display: grid; grid-template-columns: 1fr auto auto; gap: .4rem .8rem; align-items: center; }
  .result { grid-row: span 2; }
  .empty { color: var(--muted); text-align: center; padding: 2rem; font-size: .9rem; }
</style>
</head>
<body>
<header>
  <h1>NFL Model</h1>
  <a href="/">Home</a>
  <a href="/past-games">Past Games</a>
  <a href="/upcoming">Upcoming</a>
</header>
<main>
"#,
            $body,
            r#"
</main>
<script>
"#,
            $script,
            r#"
</script>
</body>
</html>"#
        )
    };
}

pub const HOME_HTML: &str = page!(
    "NFL Model",
    r#"<p>Point-spread predictions from an Elo rating model and a neural network model.</p>
<p><a href="/past-games">Browse past weeks</a> or see <a href="/upcoming">this week's games</a>.</p>"#,
    ""
);

pub const PAST_GAMES_HTML: &str = page!(
    "NFL Model - Past Games",
    r#"<div class="controls">
  <select id="seasons_dropdown" onchange="updatePastGamesPage()"></select>
  <select id="weeks_dropdown" onchange="updatePastGamesPage()"></select>
  <label><input type="radio" name="model_button" value="elo" checked onchange="updatePastGamesPage()"> Elo</label>
  <label><input type="radio" name="model_button" value="ai" onchange="updatePastGamesPage()"> AI</label>
</div>
<h2 id="week_header"></h2>
<div id="summary"></div>
<div id="game_cards"><div class="empty">Loading…</div></div>"#,
    r#"
function showCards(data) {
  document.getElementById('week_header').textContent = data.header;
  const s = data.summary;
  const decided = s.correct + s.incorrect;
  document.getElementById('summary').textContent = decided > 0
    ? `${s.correct}/${decided} correct` + (s.pending ? `, ${s.pending} pending` : '')
    : '';
  document.getElementById('game_cards').innerHTML = data.html || '<div class="empty">No games</div>';
}

async function populateDropdowns() {
  const r = await fetch('/api/options');
  if (!r.ok) return;
  const opts = await r.json();
  document.getElementById('seasons_dropdown').innerHTML = opts.seasons;
  document.getElementById('weeks_dropdown').innerHTML = opts.weeks;
}

async function updatePastGamesPage() {
  const season = document.getElementById('seasons_dropdown').value;
  const week = document.getElementById('weeks_dropdown').value;
  const model = document.querySelector('input[name="model_button"]:checked').value;
  if (!season) return;
  const r = await fetch(`/api/cards/${encodeURIComponent(season)}/${encodeURIComponent(week)}?model=${model}`);
  if (!r.ok) return;
  showCards(await r.json());
}

populateDropdowns().then(updatePastGamesPage);
"#
);

pub const UPCOMING_HTML: &str = page!(
    "NFL Model - Upcoming",
    r#"<h2 id="week_header"></h2>
<div id="game_cards"><div class="empty">Loading…</div></div>"#,
    r#"
async function updateGames() {
  const r = await fetch('/api/upcoming-cards');
  const cards = document.getElementById('game_cards');
  if (!r.ok) { cards.innerHTML = `<div class="empty">${r.status === 503 ? 'No schedule source configured' : 'Failed to load games'}</div>`; return; }
  const data = await r.json();
  document.getElementById('week_header').textContent = data.header;
  cards.innerHTML = data.html || '<div class="empty">No games this week</div>';
}

updateGames();
"#
);
