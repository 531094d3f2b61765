// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fixed catalog of sample payloads served without authentication.

use serde_json::{json, Value};

/// Names of all sample fixtures, in catalog order.
pub const SAMPLE_NAMES: &[&str] = &["covid", "weather", "stocks", "countries"];

/// Look up a sample fixture by name.
pub fn sample(name: &str) -> Option<Value> {
    let data = match name {
        "covid" => json!([
            { "date": "2023-01", "cases": 1200, "deaths": 30, "recovered": 900 },
            { "date": "2023-02", "cases": 1100, "deaths": 25, "recovered": 950 },
            { "date": "2023-03", "cases": 900, "deaths": 20, "recovered": 850 },
            { "date": "2023-04", "cases": 800, "deaths": 15, "recovered": 750 },
            { "date": "2023-05", "cases": 600, "deaths": 10, "recovered": 550 },
            { "date": "2023-06", "cases": 400, "deaths": 8, "recovered": 380 }
        ]),
        "weather" => json!([
            { "day": "Mon", "temperature": 28, "humidity": 65, "precipitation": 10 },
            { "day": "Tue", "temperature": 27, "humidity": 68, "precipitation": 20 },
            { "day": "Wed", "temperature": 30, "humidity": 60, "precipitation": 5 },
            { "day": "Thu", "temperature": 32, "humidity": 55, "precipitation": 0 },
            { "day": "Fri", "temperature": 29, "humidity": 70, "precipitation": 25 },
            { "day": "Sat", "temperature": 26, "humidity": 75, "precipitation": 30 },
            { "day": "Sun", "temperature": 25, "humidity": 65, "precipitation": 15 }
        ]),
        "stocks" => json!([
            { "month": "Jan", "AAPL": 187, "MSFT": 376, "GOOGL": 148 },
            { "month": "Feb", "AAPL": 190, "MSFT": 390, "GOOGL": 155 },
            { "month": "Mar", "AAPL": 195, "MSFT": 385, "GOOGL": 160 },
            { "month": "Apr", "AAPL": 188, "MSFT": 395, "GOOGL": 152 },
            { "month": "May", "AAPL": 200, "MSFT": 405, "GOOGL": 165 },
            { "month": "Jun", "AAPL": 210, "MSFT": 410, "GOOGL": 170 }
        ]),
        "countries" => json!([
            { "country": "USA", "population": 331, "gdp": 21.4, "area": 9.8 },
            { "country": "China", "population": 1411, "gdp": 14.7, "area": 9.6 },
            { "country": "India", "population": 1380, "gdp": 2.9, "area": 3.3 },
            { "country": "Brazil", "population": 212, "gdp": 1.8, "area": 8.5 },
            { "country": "Russia", "population": 144, "gdp": 1.7, "area": 17.1 },
            { "country": "Japan", "population": 126, "gdp": 5.1, "area": 0.4 },
            { "country": "Germany", "population": 83, "gdp": 3.8, "area": 0.4 },
            { "country": "UK", "population": 67, "gdp": 2.7, "area": 0.2 },
            { "country": "France", "population": 65, "gdp": 2.6, "area": 0.6 },
            { "country": "Italy", "population": 60, "gdp": 1.9, "area": 0.3 }
        ]),
        _ => return None,
    };
    Some(data)
}
