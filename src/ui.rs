pub fn render_index(date: &str, day_progress: f64, ledger_enabled: bool) -> String {
    let percent = (day_progress.clamp(0.0, 1.0) * 100.0).round() as u32;
    INDEX_HTML
        .replace("{{DATE}}", date)
        .replace("{{PROGRESS}}", &percent.to_string())
        .replace("{{LEDGER_HIDDEN}}", if ledger_enabled { "" } else { "hidden" })
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Day Dashboard</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --water: rgba(47, 72, 88, 0.10);
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1280px, 100%);
      margin: 0 auto;
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: end;
      gap: 12px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    #clock {
      font-size: 2.2rem;
      font-weight: 600;
      color: var(--accent-2);
      font-variant-numeric: tabular-nums;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
    }

    .progress {
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
      height: 14px;
      overflow: hidden;
    }

    #progress-fill {
      height: 100%;
      background: var(--accent);
      transition: width 600ms ease;
    }

    .board {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    .lane {
      position: relative;
      background: white;
      border-radius: 20px;
      padding: 12px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 10px;
      align-content: start;
      overflow: hidden;
    }

    .lane .water {
      position: absolute;
      inset: 0 0 auto 0;
      background: var(--water);
      pointer-events: none;
    }

    .task {
      position: relative;
      border-radius: 14px;
      padding: 10px 12px;
      border: 1px solid rgba(47, 72, 88, 0.1);
      background: rgba(255, 255, 255, 0.9);
    }

    .task.current {
      border-color: var(--accent);
      box-shadow: 0 8px 16px rgba(255, 107, 74, 0.2);
    }

    .task.completed, .task.done {
      opacity: 0.6;
    }

    .task-head {
      display: flex;
      justify-content: space-between;
      gap: 8px;
    }

    .task-time {
      font-size: 0.8rem;
      color: #8b857d;
    }

    .task-name {
      font-weight: 600;
      cursor: text;
    }

    .badge {
      border: none;
      border-radius: 999px;
      padding: 4px 10px;
      font-size: 0.8rem;
      font-weight: 600;
      cursor: pointer;
      background: rgba(47, 72, 88, 0.08);
      color: var(--accent-2);
    }

    .badge.now {
      background: var(--accent);
      color: white;
    }

    .subtask {
      display: flex;
      gap: 8px;
      align-items: center;
      font-size: 0.9rem;
      margin-top: 6px;
      cursor: pointer;
    }

    .subtask.checked span {
      text-decoration: line-through;
      color: #8b857d;
    }

    .ledger {
      display: grid;
      gap: 12px;
    }

    .ledger form {
      display: flex;
      gap: 8px;
    }

    .ledger input {
      flex: 1;
      border-radius: 999px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 10px 16px;
      font: inherit;
    }

    .ledger ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 6px;
    }

    .credit {
      color: #2d7a4b;
    }

    .debit {
      color: #c63b2b;
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Today</h1>
        <p class="subtitle" id="date">{{DATE}}</p>
      </div>
      <div id="clock">--:--:--</div>
    </header>

    <section>
      <div class="progress"><div id="progress-fill" style="width: {{PROGRESS}}%"></div></div>
      <p class="subtitle" id="progress-text">Day progress: {{PROGRESS}}%</p>
    </section>

    <section class="board" id="board"></section>

    <section class="ledger" id="ledger" {{LEDGER_HIDDEN}}>
      <h2>Ledger</h2>
      <form id="ledger-form">
        <input id="ledger-text" placeholder="Groceries - 250" autocomplete="off" />
        <button class="badge now" type="submit">Add</button>
      </form>
      <p id="ledger-summary" class="subtitle"></p>
      <ul id="ledger-list"></ul>
    </section>

    <p id="status" class="status" aria-live="polite"></p>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const boardEl = document.getElementById('board');
    const ledgerEl = document.getElementById('ledger');
    let lastMinute = null;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const api = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        throw new Error((await res.text()) || `Request failed (${res.status})`);
      }
      return res.status === 204 ? null : res.json();
    };

    const el = (tag, className, text) => {
      const node = document.createElement(tag);
      if (className) node.className = className;
      if (text !== undefined) node.textContent = text;
      return node;
    };

    const renderTask = (task) => {
      const card = el('div', `task ${task.status} ${task.completed ? 'done' : ''}`);
      const head = el('div', 'task-head');
      const info = el('div');
      info.append(el('div', 'task-time', task.time));
      const name = el('div', 'task-name', task.name);
      name.title = 'Double-click to edit';
      name.addEventListener('dblclick', () => editTask(task));
      info.append(name);
      const badge = el('button', `badge ${task.label === 'Now' ? 'now' : ''}`, task.label);
      badge.addEventListener('click', () => toggle(`/api/tasks/${encodeURIComponent(task.id)}/toggle`));
      head.append(info, badge);
      card.append(head);

      task.subtasks.forEach((subtask) => {
        const row = el('label', `subtask ${subtask.completed ? 'checked' : ''}`);
        const box = el('input');
        box.type = 'checkbox';
        box.checked = subtask.completed;
        box.addEventListener('change', () => toggle(`/api/subtasks/${encodeURIComponent(subtask.id)}/toggle`));
        row.append(box, el('span', '', subtask.label));
        card.append(row);
      });
      return card;
    };

    const renderBoard = (board) => {
      boardEl.replaceChildren(...board.columns.map((column) => {
        const lane = el('div', 'lane');
        const water = el('div', 'water');
        water.style.height = `${Math.round(column.progress * 100)}%`;
        lane.append(water, ...column.tasks.map(renderTask));
        return lane;
      }));
      const percent = Math.round(board.day_progress * 100);
      document.getElementById('progress-fill').style.width = `${percent}%`;
      document.getElementById('progress-text').textContent = `Day progress: ${percent}%`;
    };

    const loadBoard = async () => renderBoard(await api('GET', '/api/board'));

    const toggle = async (url) => {
      try {
        const res = await api('POST', url);
        setStatus(res.persisted === 'local' ? 'Saved locally (remote unavailable)' : '', '');
        await loadBoard();
      } catch (err) {
        setStatus(err.message, 'error');
      }
    };

    const editTask = async (task) => {
      const name = prompt('Task name', task.name);
      if (name === null) return;
      const time = prompt('Time (HH:MM - HH:MM)', task.time);
      if (time === null) return;
      const subtasks = prompt('Subtasks (comma separated)', task.subtasks.map((s) => s.label).join(', '));
      if (subtasks === null) return;
      try {
        await api('PUT', `/api/tasks/${encodeURIComponent(task.id)}`, {
          name,
          time,
          subtasks: subtasks.split(',').map((s) => s.trim()).filter(Boolean)
        });
        setStatus('Task updated', 'ok');
        await loadBoard();
      } catch (err) {
        setStatus(err.message, 'error');
      }
    };

    const renderLedger = (ledger) => {
      const s = ledger.summary;
      let text = `Credit ${s.total_credit} · Debit ${s.total_debit} · Net ${s.net_amount}`;
      if (ledger.summary_check.status === 'mismatch') {
        text += ` (server reports net ${ledger.summary_check.server.net_amount})`;
      }
      document.getElementById('ledger-summary').textContent = text;
      document.getElementById('ledger-list').replaceChildren(...ledger.transactions.map((tx) => {
        const row = el('li', tx.type);
        row.textContent = `${tx.type === 'credit' ? '+' : '-'}${tx.amount} ${tx.reason} `;
        const remove = el('button', 'badge', '×');
        remove.addEventListener('click', async () => {
          try {
            renderLedger(await api('DELETE', `/api/ledger/${encodeURIComponent(tx.id)}`));
          } catch (err) {
            setStatus(err.message, 'error');
          }
        });
        row.append(remove);
        return row;
      }));
    };

    document.getElementById('ledger-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const input = document.getElementById('ledger-text');
      try {
        renderLedger(await api('POST', '/api/ledger', { text: input.value }));
        input.value = '';
        setStatus('', '');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    const tick = () => {
      const now = new Date();
      document.getElementById('clock').textContent = now.toLocaleTimeString('en-GB', { hour12: false });
      const minute = now.getHours() * 60 + now.getMinutes();
      if (minute !== lastMinute) {
        lastMinute = minute;
        loadBoard().catch((err) => setStatus(err.message, 'error'));
      }
    };

    tick();
    setInterval(tick, 1000);
    setInterval(() => loadBoard().catch(() => {}), 5 * 60 * 1000);
    if (!ledgerEl.hidden) {
      const loadLedger = () => api('GET', '/api/ledger').then(renderLedger).catch((err) => setStatus(err.message, 'error'));
      loadLedger();
      setInterval(loadLedger, 10 * 60 * 1000);
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_fills_placeholders() {
        let html = render_index("2026-03-15", 0.456, false);
        assert!(html.contains("2026-03-15"));
        assert!(html.contains("Day progress: 46%"));
        assert!(html.contains(r#"id="ledger" hidden"#));
        assert!(!html.contains("{{"));
    }
}
