use chrono::{DateTime, Utc};

use crate::domain::DashboardEntry;
use crate::error::Result;

/// Renders the dashboard: one self-contained HTML file with all CSS/JS
/// inline and the listing data embedded as JSON. Filtering and search run
/// entirely client-side; every card links out through the listing's own
/// source url and nothing else.
pub fn render_dashboard(
    entries: &[DashboardEntry],
    total: usize,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    // Break any "</script>" that could appear inside listing strings so the
    // embedded JSON cannot terminate its own script block.
    let data = serde_json::to_string(entries)?.replace("</", "<\\/");

    Ok(SHELL
        .replace("__LISTINGS_JSON__", &data)
        .replace("__SHOWN__", &entries.len().to_string())
        .replace("__TOTAL__", &total.to_string())
        .replace(
            "__GENERATED_AT__",
            &generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        ))
}

const SHELL: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Rent Radar</title>
<style>
  :root { --bg: #f6f7f9; --card: #ffffff; --ink: #1f2430; --muted: #6b7280; --accent: #2563eb; }
  * { box-sizing: border-box; }
  body { margin: 0; font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: var(--bg); color: var(--ink); }
  header { padding: 20px 28px; background: var(--card); border-bottom: 1px solid #e5e7eb; }
  header h1 { margin: 0 0 4px; font-size: 22px; }
  header .meta { color: var(--muted); font-size: 13px; }
  #controls { display: flex; flex-wrap: wrap; gap: 10px; padding: 16px 28px; align-items: center; }
  #controls select, #controls input { padding: 8px 10px; border: 1px solid #d1d5db; border-radius: 8px; font-size: 14px; background: var(--card); }
  #controls input { flex: 1 1 220px; }
  #count { color: var(--muted); font-size: 13px; margin-left: auto; }
  #grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 16px; padding: 0 28px 40px; }
  .card { background: var(--card); border: 1px solid #e5e7eb; border-radius: 12px; padding: 16px; display: flex; flex-direction: column; gap: 8px; }
  .card .top { display: flex; justify-content: space-between; align-items: baseline; }
  .card .price { font-size: 20px; font-weight: 700; }
  .score { font-weight: 700; border-radius: 999px; padding: 2px 10px; font-size: 13px; color: #fff; }
  .score.hi { background: #16a34a; } .score.mid { background: #d97706; } .score.lo { background: #9ca3af; }
  .addr { font-size: 15px; }
  .facts { color: var(--muted); font-size: 13px; }
  .tags { display: flex; flex-wrap: wrap; gap: 6px; }
  .tag { background: #eef2ff; color: #3730a3; border-radius: 6px; padding: 2px 8px; font-size: 12px; }
  .src { color: var(--muted); font-size: 12px; }
  .card a.out { margin-top: auto; color: var(--accent); text-decoration: none; font-size: 14px; }
  .card a.out:hover { text-decoration: underline; }
  #empty { padding: 60px 28px; text-align: center; color: var(--muted); }
</style>
</head>
<body>
<header>
  <h1>Rent Radar</h1>
  <div class="meta">Generated __GENERATED_AT__ &middot; showing __SHOWN__ of __TOTAL__ deduplicated listings</div>
</header>
<div id="controls">
  <select id="f-source">
    <option value="">All sources</option>
    <option value="rentcast">RentCast</option>
    <option value="zillow">Zillow</option>
    <option value="redfin">Redfin</option>
  </select>
  <select id="f-band">
    <option value="0">Any score</option>
    <option value="80">80+</option>
    <option value="60">60+</option>
    <option value="40">40+</option>
  </select>
  <select id="f-tag"><option value="">Any tag</option></select>
  <input id="f-text" type="search" placeholder="Search address...">
  <span id="count"></span>
</div>
<div id="grid"></div>
<div id="empty" hidden>No listings match the current filters.</div>
<script>
const LISTINGS = __LISTINGS_JSON__;

const esc = (s) => String(s ?? "").replace(/[&<>"']/g,
  (c) => ({"&":"&amp;","<":"&lt;",">":"&gt;",'"':"&quot;","'":"&#39;"}[c]));

const tagSelect = document.getElementById("f-tag");
[...new Set(LISTINGS.flatMap((l) => l.tags))].sort().forEach((tag) => {
  const opt = document.createElement("option");
  opt.value = tag;
  opt.textContent = tag;
  tagSelect.appendChild(opt);
});

function scoreClass(score) {
  return score >= 80 ? "hi" : score >= 60 ? "mid" : "lo";
}

function card(l) {
  const facts = [];
  facts.push(l.bedrooms + " bd");
  if (l.bathrooms != null) facts.push(l.bathrooms + " ba");
  if (l.size_sqft != null) facts.push(l.size_sqft.toLocaleString() + " sqft");
  if (l.photos_count) facts.push(l.photos_count + " photos");
  return `<div class="card">
    <div class="top">
      <span class="price">$${l.price.toLocaleString()}/mo</span>
      <span class="score ${scoreClass(l.score)}">${l.score}</span>
    </div>
    <div class="addr">${esc(l.address)}, ${esc(l.city)} ${esc(l.zip_code)}</div>
    <div class="facts">${facts.join(" · ")}</div>
    <div class="tags">${l.tags.map((t) => `<span class="tag">${esc(t)}</span>`).join("")}</div>
    <span class="src">via ${esc(l.source)}</span>
    <a class="out" href="${esc(l.url)}" target="_blank" rel="noopener">View original listing →</a>
  </div>`;
}

function apply() {
  const source = document.getElementById("f-source").value;
  const band = Number(document.getElementById("f-band").value);
  const tag = tagSelect.value;
  const text = document.getElementById("f-text").value.trim().toLowerCase();

  const shown = LISTINGS.filter((l) =>
    (!source || l.source === source) &&
    l.score >= band &&
    (!tag || l.tags.includes(tag)) &&
    (!text || l.address.toLowerCase().includes(text)));

  document.getElementById("grid").innerHTML = shown.map(card).join("");
  document.getElementById("empty").hidden = shown.length > 0;
  document.getElementById("count").textContent = shown.length + " shown";
}

for (const id of ["f-source", "f-band", "f-tag", "f-text"]) {
  document.getElementById(id).addEventListener("input", apply);
}
apply();
</script>
</body>
</html>
"##;
