//! HTML pages.
//!
//! Inline templates without a template engine. Each page takes the
//! read-only data it shows and returns the full document.

use time::{macros::format_description, OffsetDateTime};

use crate::scores::{repo_types::LeaderboardEntry, services::Profile};

const STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
        max-width: 900px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
        color: #333;
    }
    nav a { margin-right: 16px; }
    .container { background: white; padding: 30px; border-radius: 8px; }
    .flash { background: #fee; border: 1px solid #c33; color: #c33; padding: 10px; border-radius: 4px; }
    .form-group { margin: 15px 0; }
    label { display: block; font-weight: bold; margin-bottom: 5px; }
    table { border-collapse: collapse; width: 100%; }
    th, td { text-align: left; padding: 8px; border-bottom: 1px solid #ddd; }
    .stats span { display: inline-block; margin-right: 24px; }
"#;

fn layout(title: &str, body: &str) -> String {
    let title = html_escape(title);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Keystrike - {title}</title>
    <style>{STYLES}</style>
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/leaderboard">Leaderboard</a>
        <a href="/profile">Profile</a>
        <a href="/login">Login</a>
        <a href="/register">Register</a>
        <a href="/logout">Logout</a>
    </nav>
    <div class="container">
{body}
    </div>
</body>
</html>"#
    )
}

fn flash(message: Option<&str>) -> String {
    message.map_or(String::new(), |m| {
        format!(r#"<div class="flash">{}</div>"#, html_escape(m))
    })
}

pub fn home_page(signed_in: bool) -> String {
    let status = if signed_in {
        "Your results are saved to your profile."
    } else {
        r#"Playing as guest. <a href="/login">Log in</a> to keep your results."#
    };
    layout(
        "Home",
        &format!(
            r#"        <h1>Keystrike</h1>
        <p>{status}</p>
        <div id="typing-test"></div>
        <script src="/static/main.js" defer></script>"#
        ),
    )
}

pub fn login_page(message: Option<&str>) -> String {
    let flash = flash(message);
    layout(
        "Login",
        &format!(
            r#"        <h1>Login</h1>
        {flash}
        <form method="POST" action="/login">
            <div class="form-group">
                <label for="username">Username</label>
                <input type="text" id="username" name="username" autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password</label>
                <input type="password" id="password" name="password">
            </div>
            <button type="submit">Login</button>
        </form>
        <p>No account? <a href="/register">Register</a></p>"#
        ),
    )
}

pub fn register_page(message: Option<&str>) -> String {
    let flash = flash(message);
    layout(
        "Register",
        &format!(
            r#"        <h1>Register</h1>
        {flash}
        <form method="POST" action="/register">
            <div class="form-group">
                <label for="username">Username</label>
                <input type="text" id="username" name="username" autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password</label>
                <input type="password" id="password" name="password">
            </div>
            <div class="form-group">
                <label for="confirmation">Confirm password</label>
                <input type="password" id="confirmation" name="confirmation">
            </div>
            <button type="submit">Create account</button>
        </form>
        <p>Already registered? <a href="/login">Login</a></p>"#
        ),
    )
}

pub fn leaderboard_page(entries: &[LeaderboardEntry]) -> String {
    let rows = if entries.is_empty() {
        r#"<tr><td colspan="5">No results yet.</td></tr>"#.to_string()
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    i + 1,
                    html_escape(&e.name),
                    e.max_wpm,
                    percent(e.accuracy),
                    html_escape(e.mode.as_deref().unwrap_or("-")),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    layout(
        "Leaderboard",
        &format!(
            r#"        <h1>Leaderboard</h1>
        <table>
            <tr><th>#</th><th>Name</th><th>WPM</th><th>Accuracy</th><th>Mode</th></tr>
            {rows}
        </table>"#
        ),
    )
}

pub fn profile_page(profile: &Profile) -> String {
    let stats = &profile.stats;
    let max = stats.max_wpm.map_or("-".to_string(), |w| w.to_string());
    let avg = stats.avg_wpm.map_or("-".to_string(), |w| w.to_string());
    let history = profile
        .history
        .iter()
        .map(|a| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                a.wpm,
                percent(a.accuracy),
                html_escape(a.mode.as_deref().unwrap_or("-")),
                timestamp(a.timestamp),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    layout(
        "Profile",
        &format!(
            r#"        <h1>{name}</h1>
        <p>Member since {since}</p>
        <div class="stats">
            <span>Best: {max} wpm</span>
            <span>Average: {avg} wpm</span>
            <span>Tests: {total}</span>
        </div>
        <h2>History</h2>
        <table>
            <tr><th>WPM</th><th>Accuracy</th><th>Mode</th><th>When</th></tr>
            {history}
        </table>"#,
            name = html_escape(&profile.user.name),
            since = timestamp(profile.user.created_at),
            total = stats.total_tests,
        ),
    )
}

pub fn not_found_page() -> String {
    layout(
        "Not found",
        r#"        <h1>404</h1>
        <p>That page does not exist. <a href="/">Back home</a></p>"#,
    )
}

fn percent(accuracy: Option<f64>) -> String {
    accuracy.map_or("-".to_string(), |a| format!("{a}%"))
}

fn timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_default()
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
