//! Embedded HTML/CSS/JS frontend for the predsweep web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>predsweep Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

/* Layout */
.app {
  max-width: 1100px;
  margin: 0 auto;
  padding: 24px;
}

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}

header h1 {
  font-size: 24px;
  font-weight: 600;
  display: flex;
  align-items: center;
  gap: 10px;
}

header h1 .logo {
  color: var(--accent);
  font-family: var(--mono);
  font-weight: 700;
}

header .subtitle {
  color: var(--text-muted);
  font-size: 13px;
}

.health-badges {
  display: flex;
  gap: 8px;
}

.badge {
  display: inline-flex;
  align-items: center;
  gap: 4px;
  padding: 4px 10px;
  border-radius: 12px;
  font-size: 12px;
  font-weight: 500;
  background: var(--surface);
  border: 1px solid var(--border);
}

.badge.ok { border-color: var(--green); color: var(--green); }
.badge.warn { border-color: var(--yellow); color: var(--yellow); }

/* Navigation */
nav {
  display: flex;
  gap: 4px;
  margin-bottom: 24px;
  background: var(--surface);
  border-radius: var(--radius);
  padding: 4px;
  border: 1px solid var(--border);
}

nav button {
  flex: 1;
  padding: 8px 16px;
  border: none;
  border-radius: 6px;
  background: transparent;
  color: var(--text-muted);
  font-size: 13px;
  font-weight: 500;
  cursor: pointer;
  transition: all 0.15s;
}

nav button:hover { color: var(--text); background: rgba(255,255,255,0.04); }
nav button.active { background: var(--accent); color: #fff; }

/* Cards */
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}

.card h2 {
  font-size: 16px;
  font-weight: 600;
  margin-bottom: 16px;
  color: var(--text);
}

/* Stats grid */
.stats-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
  gap: 16px;
  margin-bottom: 24px;
}

.stat-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  text-align: center;
}

.stat-card .value {
  font-size: 32px;
  font-weight: 700;
  font-family: var(--mono);
  color: var(--accent);
  line-height: 1.1;
}

.stat-card .value.green { color: var(--green); }
.stat-card .value.red { color: var(--red); }

.stat-card .label {
  font-size: 12px;
  color: var(--text-muted);
  margin-top: 6px;
  text-transform: uppercase;
  letter-spacing: 0.5px;
}

/* Accuracy bar chart */
.chart {
  display: flex;
  align-items: flex-end;
  justify-content: center;
  gap: 48px;
  height: 220px;
  padding-top: 20px;
  margin-bottom: 8px;
}

.chart .bar-group {
  display: flex;
  flex-direction: column;
  align-items: center;
  height: 100%;
  justify-content: flex-end;
  width: 120px;
}

.chart .bar {
  width: 100%;
  border-radius: 4px 4px 0 0;
  min-height: 2px;
  transition: height 0.3s;
}

.chart .bar.correct { background: var(--green); }
.chart .bar.incorrect { background: var(--red); }

.chart .bar-count {
  font-family: var(--mono);
  font-size: 13px;
  color: var(--text);
  margin-bottom: 6px;
}

.chart .bar-label {
  font-size: 12px;
  color: var(--text-muted);
  margin-top: 8px;
}

/* Progress bar */
.progress-track {
  height: 10px;
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 5px;
  overflow: hidden;
}

.progress-fill {
  height: 100%;
  background: var(--accent);
  width: 0;
  transition: width 0.3s;
}

.progress-caption {
  font-size: 12px;
  color: var(--text-muted);
  margin-top: 8px;
  font-family: var(--mono);
}

/* Miss gallery */
.miss-grid {
  display: flex;
  flex-wrap: wrap;
  gap: 12px;
}

.miss-grid figure {
  text-align: center;
}

.miss-grid img {
  width: 100px;
  height: 100px;
  object-fit: contain;
  background: #fff;
  border: 1px solid var(--border);
  border-radius: 6px;
}

.miss-grid figcaption {
  font-size: 11px;
  color: var(--text-muted);
  font-family: var(--mono);
  margin-top: 4px;
}

/* Config page */
.config-section {
  margin-bottom: 24px;
}

.config-section h3 {
  font-size: 14px;
  font-weight: 600;
  color: var(--text-muted);
  margin-bottom: 12px;
  padding-bottom: 8px;
  border-bottom: 1px solid var(--border);
}

.config-row {
  display: flex;
  align-items: center;
  padding: 8px 0;
  gap: 12px;
}

.config-row label {
  flex: 0 0 240px;
  font-size: 13px;
  color: var(--text);
}

.config-row .desc {
  font-size: 11px;
  color: var(--text-muted);
  display: block;
}

.config-row input[type="text"],
.config-row input[type="number"] {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  color: var(--text);
  padding: 6px 10px;
  font-size: 13px;
  font-family: var(--mono);
  width: 260px;
}

.config-row input:focus {
  outline: none;
  border-color: var(--accent);
}

.toggle {
  position: relative;
  width: 40px;
  height: 22px;
}

.toggle input {
  opacity: 0;
  width: 0;
  height: 0;
}

.toggle .slider {
  position: absolute;
  inset: 0;
  background: var(--border);
  border-radius: 22px;
  cursor: pointer;
  transition: 0.2s;
}

.toggle .slider::before {
  content: '';
  position: absolute;
  width: 16px;
  height: 16px;
  left: 3px;
  bottom: 3px;
  background: var(--text);
  border-radius: 50%;
  transition: 0.2s;
}

.toggle input:checked + .slider { background: var(--green); }
.toggle input:checked + .slider::before { transform: translateX(18px); }

/* Buttons */
.btn {
  display: inline-flex;
  align-items: center;
  gap: 6px;
  padding: 8px 16px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--surface);
  color: var(--text);
  font-size: 13px;
  cursor: pointer;
  transition: all 0.15s;
}

.btn:hover { border-color: var(--accent); color: var(--accent); }
.btn.primary { background: var(--accent); color: #fff; border-color: var(--accent); }
.btn.primary:hover { opacity: 0.85; }
.btn.danger { border-color: var(--red); color: var(--red); }
.btn.danger:hover { background: var(--red); color: #fff; }

.btn-group {
  display: flex;
  gap: 8px;
  margin-top: 16px;
}

/* Toast notification */
.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  padding: 12px 20px;
  border-radius: var(--radius);
  background: var(--green);
  color: #fff;
  font-weight: 500;
  font-size: 13px;
  transform: translateY(80px);
  opacity: 0;
  transition: all 0.3s;
  z-index: 1000;
}

.toast.show { transform: translateY(0); opacity: 1; }
.toast.error { background: var(--red); }

/* Panels / Tabs */
.panel { display: none; }
.panel.active { display: block; }

/* Empty state */
.empty {
  text-align: center;
  padding: 40px 20px;
  color: var(--text-muted);
}

.empty p { max-width: 400px; margin: 0 auto; }

/* Responsive */
@media (max-width: 768px) {
  .stats-grid { grid-template-columns: repeat(2, 1fr); }
  .config-row { flex-direction: column; align-items: flex-start; }
  .config-row label { flex: none; }
  nav { flex-wrap: wrap; }
}
</style>
</head>
<body>
<div class="app">

  <!-- Header -->
  <header>
    <div>
      <h1><span class="logo">&gt;_ predsweep</span> Dashboard</h1>
      <div class="subtitle">Sequential whole-dataset evaluation</div>
    </div>
    <div class="health-badges" id="health-badges"></div>
  </header>

  <!-- Navigation -->
  <nav id="nav">
    <button class="active" data-panel="progress">Progress</button>
    <button data-panel="misses">Misses</button>
    <button data-panel="config">Configuration</button>
  </nav>

  <!-- Progress Panel -->
  <div class="panel active" id="panel-progress">
    <div class="stats-grid">
      <div class="stat-card"><div class="value" id="stat-done">—</div><div class="label">Samples Tested</div></div>
      <div class="stat-card"><div class="value green" id="stat-correct">—</div><div class="label">Correct</div></div>
      <div class="stat-card"><div class="value red" id="stat-incorrect">—</div><div class="label">Incorrect</div></div>
      <div class="stat-card"><div class="value" id="stat-accuracy">—</div><div class="label">Accuracy</div></div>
    </div>

    <div class="card">
      <h2>Prediction Accuracy</h2>
      <div class="chart" id="graph">
        <div class="bar-group">
          <div class="bar-count" id="count-correct">0</div>
          <div class="bar correct" id="bar-correct" style="height:2px"></div>
          <div class="bar-label">Correct</div>
        </div>
        <div class="bar-group">
          <div class="bar-count" id="count-incorrect">0</div>
          <div class="bar incorrect" id="bar-incorrect" style="height:2px"></div>
          <div class="bar-label">Incorrect</div>
        </div>
      </div>
    </div>

    <div class="card">
      <h2>Sweep Progress</h2>
      <div class="progress-track"><div class="progress-fill" id="progress-fill"></div></div>
      <div class="progress-caption" id="progress-caption">—</div>
      <div class="btn-group">
        <button class="btn danger" id="btn-reset">Reset Sweep</button>
      </div>
    </div>
  </div>

  <!-- Misses Panel -->
  <div class="panel" id="panel-misses">
    <div class="card">
      <h2>Misclassified Samples</h2>
      <div class="miss-grid" id="incorrect-container"></div>
      <div class="empty" id="misses-empty" style="display:none">
        <p>No misclassified samples recorded yet. Images appear here as the sweep finds them.</p>
      </div>
    </div>
  </div>

  <!-- Config Panel -->
  <div class="panel" id="panel-config">
    <div class="card">
      <h2>Configuration Editor</h2>
      <p style="color:var(--text-muted);margin-bottom:16px;font-size:13px">
        Changes are saved to <code style="color:var(--accent)">~/.predsweep/config.toml</code>
        and take effect on the next <code style="color:var(--accent)">predsweep run</code>.
      </p>

      <div class="config-section">
        <h3>Endpoint</h3>
        <div class="config-row">
          <label>Base URL<span class="desc">Prediction service address</span></label>
          <input type="text" id="cfg-endpoint-url" data-key="endpoint.url">
        </div>
        <div class="config-row">
          <label>Timeout (ms)<span class="desc">Per-request timeout</span></label>
          <input type="number" id="cfg-endpoint-timeout_ms" data-key="endpoint.timeout_ms" min="100" step="100">
        </div>
      </div>

      <div class="config-section">
        <h3>Sweep</h3>
        <div class="config-row">
          <label>Total Samples<span class="desc">Dataset size bound</span></label>
          <input type="number" id="cfg-sweep-total_samples" data-key="sweep.total_samples" min="1">
        </div>
        <div class="config-row">
          <label>Interval (ms)<span class="desc">Target tick cadence; steps are serialized</span></label>
          <input type="number" id="cfg-sweep-interval_ms" data-key="sweep.interval_ms" min="0">
        </div>
      </div>

      <div class="config-section">
        <h3>Gallery</h3>
        <div class="config-row">
          <label>Directory<span class="desc">Where downloaded miss images land</span></label>
          <input type="text" id="cfg-gallery-dir" data-key="gallery.dir">
        </div>
        <div class="config-row">
          <label>Download<span class="desc">Fetch miss images from the service</span></label>
          <div class="toggle"><input type="checkbox" id="cfg-gallery-download" data-key="gallery.download"><span class="slider"></span></div>
        </div>
      </div>

      <div class="config-section">
        <h3>Logging</h3>
        <div class="config-row">
          <label>Enabled<span class="desc">One JSONL line per step attempt</span></label>
          <div class="toggle"><input type="checkbox" id="cfg-logging-enabled" data-key="logging.enabled"><span class="slider"></span></div>
        </div>
        <div class="config-row">
          <label>Path<span class="desc">Step log location</span></label>
          <input type="text" id="cfg-logging-path" data-key="logging.path">
        </div>
      </div>

      <div class="btn-group">
        <button class="btn primary" id="btn-save-config">Save Configuration</button>
        <button class="btn danger" id="btn-reset-config">Reset to Defaults</button>
      </div>
    </div>
  </div>

</div>

<!-- Toast -->
<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
let currentPanel = 'progress';
let configData = null;
let completionAnnounced = false;

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  return res.json();
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

function fmt(n) {
  if (n === undefined || n === null) return '—';
  return n.toLocaleString();
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------
document.getElementById('nav').addEventListener('click', e => {
  if (e.target.tagName !== 'BUTTON') return;
  const panel = e.target.dataset.panel;
  if (!panel) return;

  document.querySelectorAll('nav button').forEach(b => b.classList.remove('active'));
  e.target.classList.add('active');

  document.querySelectorAll('.panel').forEach(p => p.classList.remove('active'));
  document.getElementById('panel-' + panel).classList.add('active');

  currentPanel = panel;
  loadPanel(panel);
});

function loadPanel(panel) {
  switch (panel) {
    case 'progress': return loadProgress();
    case 'misses': return loadMisses();
    case 'config': return loadConfig();
  }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------
async function loadProgress() {
  try {
    const p = await api('GET', '/api/progress');
    renderProgress(p);
  } catch (e) {
    toast('Failed to load progress: ' + e.message, true);
  }
}

function updateGraph(correct, incorrect) {
  const graph = document.getElementById('graph');
  if (!graph) return;

  const max = Math.max(correct, incorrect, 1);
  const correctPct = Math.max((correct / max) * 100, 1);
  const incorrectPct = Math.max((incorrect / max) * 100, 1);

  document.getElementById('bar-correct').style.height = correctPct + '%';
  document.getElementById('bar-incorrect').style.height = incorrectPct + '%';
  document.getElementById('count-correct').textContent = fmt(correct);
  document.getElementById('count-incorrect').textContent = fmt(incorrect);
}

function renderProgress(p) {
  document.getElementById('stat-done').textContent = fmt(p.samples_done);
  document.getElementById('stat-correct').textContent = fmt(p.correct);
  document.getElementById('stat-incorrect').textContent = fmt(p.incorrect);
  document.getElementById('stat-accuracy').textContent =
    (p.correct + p.incorrect) > 0 ? p.accuracy_pct.toFixed(2) + '%' : '—';

  updateGraph(p.correct, p.incorrect);

  const pct = p.total_samples > 0 ? (p.samples_done / p.total_samples) * 100 : 0;
  document.getElementById('progress-fill').style.width = pct + '%';
  document.getElementById('progress-caption').textContent =
    fmt(p.samples_done) + ' / ' + fmt(p.total_samples) + ' samples' +
    (p.failed_steps > 0 ? ' · ' + fmt(p.failed_steps) + ' failed steps' : '');

  if (p.complete && !completionAnnounced) {
    completionAnnounced = true;
    alert('All test samples have been processed!');
  }
}

// ---------------------------------------------------------------------------
// Misses
// ---------------------------------------------------------------------------
async function loadMisses() {
  try {
    const g = await api('GET', '/api/gallery');
    renderMisses(g.entries || []);
  } catch (e) {
    toast('Failed to load gallery: ' + e.message, true);
  }
}

function renderMisses(entries) {
  const container = document.getElementById('incorrect-container');
  const empty = document.getElementById('misses-empty');
  empty.style.display = entries.length === 0 ? 'block' : 'none';

  // Append-only and idempotent: an image that is already present is never
  // recreated, so re-polling leaves the grid untouched.
  for (const entry of entries) {
    const id = 'incorrect-img-' + entry.id;
    if (document.getElementById(id)) continue;

    const figure = document.createElement('figure');
    const img = document.createElement('img');
    img.id = id;
    img.src = entry.local_url || entry.remote_url;
    img.alt = 'Incorrect Prediction ' + entry.id;
    img.width = 100;
    const caption = document.createElement('figcaption');
    caption.textContent = '#' + entry.id;
    figure.appendChild(img);
    figure.appendChild(caption);
    container.appendChild(figure);
  }
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------
document.getElementById('btn-reset').addEventListener('click', async () => {
  if (!confirm('Reset the sweep? This zeroes the service counters and deletes its stored miss images.')) return;

  try {
    const result = await api('POST', '/api/reset');
    if (result.success) {
      toast(result.message || 'Sweep reset');
      completionAnnounced = false;
      document.getElementById('incorrect-container').innerHTML = '';
      loadProgress();
    } else {
      toast('Reset failed', true);
    }
  } catch (e) {
    toast('Reset failed: ' + e.message, true);
  }
});

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------
async function loadConfig() {
  try {
    configData = await api('GET', '/api/config');
    renderConfig();
  } catch (e) {
    toast('Failed to load config: ' + e.message, true);
  }
}

function renderConfig() {
  const c = configData.config;

  setText('cfg-endpoint-url', c.endpoint.url);
  setNumber('cfg-endpoint-timeout_ms', c.endpoint.timeout_ms);
  setNumber('cfg-sweep-total_samples', c.sweep.total_samples);
  setNumber('cfg-sweep-interval_ms', c.sweep.interval_ms);
  setText('cfg-gallery-dir', c.gallery.dir);
  setToggle('cfg-gallery-download', c.gallery.download);
  setToggle('cfg-logging-enabled', c.logging.enabled);
  setText('cfg-logging-path', c.logging.path);
}

function setToggle(id, val) {
  const el = document.getElementById(id);
  if (el) el.checked = !!val;
}

function setText(id, val) {
  const el = document.getElementById(id);
  if (el) el.value = val || '';
}

function setNumber(id, val) {
  const el = document.getElementById(id);
  if (el) el.value = val;
}

// Save config
document.getElementById('btn-save-config').addEventListener('click', async () => {
  const updates = [];

  document.querySelectorAll('[data-key]').forEach(el => {
    const key = el.dataset.key;
    let value;
    if (el.type === 'checkbox') {
      value = el.checked ? 'true' : 'false';
    } else {
      value = el.value;
    }
    updates.push({ key, value });
  });

  try {
    const result = await api('PUT', '/api/config', { updates });
    if (result.success) {
      toast('Configuration saved successfully');
    } else {
      toast('Some settings failed: ' + result.errors.join(', '), true);
    }
  } catch (e) {
    toast('Failed to save config: ' + e.message, true);
  }
});

// Reset config
document.getElementById('btn-reset-config').addEventListener('click', async () => {
  if (!confirm('Reset all configuration to defaults? This will overwrite your config.toml file.')) return;

  try {
    const result = await api('POST', '/api/config/reset');
    if (result.success) {
      toast('Configuration reset to defaults');
      loadConfig();
    } else {
      toast('Failed to reset config', true);
    }
  } catch (e) {
    toast('Failed to reset config: ' + e.message, true);
  }
});

// ---------------------------------------------------------------------------
// Health badges
// ---------------------------------------------------------------------------
async function loadHealth() {
  try {
    const h = await api('GET', '/api/health');
    const badges = document.getElementById('health-badges');
    badges.innerHTML = [
      badge('Endpoint', h.endpoint_reachable ? 'ok' : 'warn'),
      badge('Config', h.config_exists ? 'ok' : 'warn'),
      badge('Log', h.log_exists ? 'ok' : 'warn'),
    ].join('');
  } catch (e) {
    // Silently ignore health badge errors
  }
}

function badge(label, cls) {
  const dot = cls === 'ok' ? '●' : '○';
  return `<span class="badge ${cls}">${dot} ${label}</span>`;
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
updateGraph(0, 0);
loadHealth();
loadProgress();

// Live refresh: progress always, misses when that panel is open.
setInterval(() => {
  loadProgress();
  if (currentPanel === 'misses') loadMisses();
}, 2000);
</script>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_carries_the_hosting_page_contract() {
        // Element ids the dashboard script drives.
        assert!(INDEX_HTML.contains("id=\"graph\""));
        assert!(INDEX_HTML.contains("id=\"incorrect-container\""));
        assert!(INDEX_HTML.contains("All test samples have been processed!"));
    }

    #[test]
    fn frontend_talks_to_every_api_endpoint() {
        for endpoint in [
            "/api/progress",
            "/api/gallery",
            "/api/health",
            "/api/config",
            "/api/config/reset",
            "/api/reset",
        ] {
            assert!(INDEX_HTML.contains(endpoint), "missing {endpoint}");
        }
    }
}
