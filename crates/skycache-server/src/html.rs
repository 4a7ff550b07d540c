//! Home page rendering.

use skycache_weather::{CurrentConditions, Reading};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn optional_reading(value: Option<&Reading>) -> String {
    value.map(Reading::to_string).unwrap_or_else(|| "-".to_string())
}

/// Form plus a one-row table of current conditions for `city`.
pub fn weather_page(city: &str, current: &CurrentConditions) -> String {
    format!(
        r#"<html>
<body style="font-family:Arial;background:#eef;padding:40px;">
    <form method="POST" style="text-align:center;">
        <input name="city" placeholder="Enter city" style="padding:10px;width:200px;">
        <button style="padding:10px;">Get Weather</button>
    </form>

    <div style="max-width:600px;margin:auto;background:white;padding:20px;border-radius:10px;">
        <h2 style="text-align:center;">Weather for {city}</h2>
        <table border="1" width="100%" style="border-collapse:collapse;">
            <tr><th>Country</th><th>Coords</th><th>Temp °C</th><th>Pressure</th><th>Humidity</th></tr>
            <tr>
                <td>{country}</td>
                <td>{lon}, {lat}</td>
                <td>{temp}</td>
                <td>{pressure}</td>
                <td>{humidity}</td>
            </tr>
        </table>
    </div>
</body>
</html>
"#,
        city = escape(city),
        country = escape(current.country.as_deref().unwrap_or("-")),
        lon = current.coord.lon,
        lat = current.coord.lat,
        temp = current.temperature,
        pressure = optional_reading(current.pressure.as_ref()),
        humidity = optional_reading(current.humidity.as_ref()),
    )
}

pub fn error_page(message: &str) -> String {
    format!("<h3>Error: {}</h3>", escape(message))
}
