pub const PAGE_CSS: &str = r#":root {
  color-scheme: light;
  --pk-bg: #ffffff;
  --pk-fg: #1f2328;
  --pk-muted: #59636e;
  --pk-border: #d1d9e0;
  --pk-surface: #f6f8fa;
  --pk-accent: #0969da;
}

:root[data-theme="dark"] {
  color-scheme: dark;
  --pk-bg: #0d1117;
  --pk-fg: #e6edf3;
  --pk-muted: #9198a1;
  --pk-border: #3d444d;
  --pk-surface: #151b23;
  --pk-accent: #4493f8;
}

* { box-sizing: border-box; }

body {
  margin: 0;
  background: var(--pk-bg);
  color: var(--pk-fg);
  font: 16px/1.5 system-ui, -apple-system, "Segoe UI", Roboto, sans-serif;
}

.pk-container {
  max-width: 720px;
  margin: 0 auto;
  padding: 16px;
}

.pk-topbar {
  display: flex;
  justify-content: space-between;
  align-items: center;
  border-bottom: 1px solid var(--pk-border);
}

.pk-widget {
  margin: 24px 0;
  padding: 16px;
  border: 1px solid var(--pk-border);
  border-radius: 8px;
  background: var(--pk-surface);
}

.pk-widget input[type="text"] {
  display: block;
  width: 100%;
  margin: 8px 0;
  padding: 6px 8px;
  border: 1px solid var(--pk-border);
  border-radius: 6px;
  color: inherit;
  background: var(--pk-bg);
}

button {
  padding: 6px 12px;
  border: 1px solid var(--pk-border);
  border-radius: 6px;
  color: var(--pk-accent);
  background: var(--pk-bg);
  cursor: pointer;
}

.hide-container { display: none; }
.show-container { display: block; padding: 16px; }

#qrCodeContainer img { display: block; }

#pelicanImage {
  display: block;
  max-width: 100%;
  margin-top: 12px;
}
"#;
