use std::fmt::Write;

use crate::board::Board;
use crate::episode::{Episode, MAX_CHARACTERS};
use crate::notification::{Level, Notification};

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; }
main { display: grid; grid-template-columns: 2fr 1fr; gap: 1.5rem; padding: 1.5rem; }
.cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(18rem, 1fr)); gap: 1rem; }
.card, .panel { border: 1px solid #ddd; border-radius: .5rem; padding: 1rem; }
.card header { display: flex; justify-content: space-between; }
.card img { width: 30px; height: 30px; border-radius: 50%; }
.star { background: none; border: none; font-size: 1.3rem; cursor: pointer; }
.star.on { color: gold; }
.error { color: #c00; font-size: .85rem; }
.toast { padding: .5rem 1rem; margin: .5rem 1.5rem; border-radius: .3rem; }
.toast.success { background: #e6f6e6; }
.toast.error { background: #fbe3e3; }
"#;

// re-validates each edited field through /api/form as the user types;
// only the newest request's answer is applied
const SCRIPT: &str = r#"
const form = document.getElementById('create');
let latest = 0;
form.addEventListener('input', async (event) => {
  const field = event.target;
  const seq = ++latest;
  const res = await fetch('/api/form', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ [field.name]: field.value }),
  });
  const state = await res.json();
  if (seq !== latest) return;
  document.getElementById('title-error').textContent = state.title_error || '';
  document.getElementById('characters-error').textContent = state.characters_error || '';
  form.querySelector('button[type=submit]').disabled = !state.valid;
});
"#;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn star(out: &mut String, id: i64, on: bool) {
    let _ = write!(
        out,
        r#"<form method="post" action="/favorites/{id}"><button class="star{}" title="toggle favorite">{}</button></form>"#,
        if on { " on" } else { "" },
        if on { "★" } else { "☆" },
    );
}

fn card(out: &mut String, ep: &Episode, favorite: bool) {
    out.push_str(r#"<article class="card"><header><div>"#);
    let _ = write!(
        out,
        "<h3>{}</h3><p>Episode: {}</p></div>",
        escape(&ep.name),
        escape(&ep.episode)
    );
    star(out, ep.id, favorite);
    let _ = write!(
        out,
        "</header><p><strong>Air date:</strong> {}</p><footer>",
        escape(&ep.air_date)
    );
    for c in ep.character.iter().take(MAX_CHARACTERS) {
        let _ = write!(
            out,
            r#"<img src="{}" alt="{name}" title="{name}">"#,
            escape(&c.image),
            name = escape(&c.name),
        );
    }
    out.push_str("</footer></article>");
}

fn catalog(out: &mut String, board: &Board) {
    out.push_str(r#"<section>"#);
    if board.is_loading() {
        out.push_str("<p>Loading episodes...</p>");
    } else {
        out.push_str(r#"<div class="cards">"#);
        for ep in board.catalog() {
            card(out, ep, board.favorites().is_favorite(ep.id));
        }
        out.push_str("</div>");
    }
    out.push_str("</section>");
}

fn favorites(out: &mut String, board: &Board) {
    out.push_str(r#"<section class="panel"><h2>Favorites</h2>"#);
    let favorites = board.favorites().favorites();
    if favorites.is_empty() {
        out.push_str("<p>You haven't added any favorite episodes yet.</p>");
    }
    for fav in favorites {
        let _ = write!(out, r#"<div class="card"><header><span>{}</span>"#, escape(&fav.name));
        star(out, fav.id, true);
        out.push_str("</header></div>");
    }
    out.push_str("</section>");
}

fn form(out: &mut String, board: &Board) {
    let form = board.form();
    let errors = form.errors();

    let _ = write!(
        out,
        r#"<section class="panel"><h2>Create episode</h2>
<form id="create" method="post" action="/episodes">
<p><label for="title">Title</label><br>
<input id="title" name="title" placeholder="Episode title" value="{}">
<br><span id="title-error" class="error">{}</span></p>
<p><label for="characters">Character ids</label><br>
<input id="characters" name="characters" placeholder="e.g. 1-2-3-4-5" value="{}">
<br><span id="characters-error" class="error">{}</span></p>
<button type="submit"{}>Add episode</button>
</form></section>"#,
        escape(form.title()),
        errors.title.map(escape).unwrap_or_default(),
        escape(form.characters()),
        errors.characters.map(escape).unwrap_or_default(),
        if form.is_valid() { "" } else { " disabled" },
    );
}

fn toasts(out: &mut String, notifications: &[Notification]) {
    for n in notifications {
        let class = match n.level {
            Level::Success => "success",
            Level::Error => "error",
        };
        let _ = write!(
            out,
            r#"<div class="toast {class}">{}</div>"#,
            escape(&n.message)
        );
    }
}

pub fn page(board: &Board, notifications: &[Notification]) -> String {
    let mut out = String::with_capacity(16 * 1024);

    let _ = write!(
        out,
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Episodes</title><style>{STYLE}</style></head><body>"
    );
    toasts(&mut out, notifications);
    out.push_str("<main>");
    catalog(&mut out, board);
    out.push_str("<div>");
    favorites(&mut out, board);
    form(&mut out, board);
    out.push_str("</div></main>");
    let _ = write!(out, "<script>{SCRIPT}</script></body></html>");

    out
}
