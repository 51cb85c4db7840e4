use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::error::{RunError, RunResult};
use crate::models::{
    Cell, CustomerProfile, LayoutEntry, LayoutRole, PickTimeCatalog, PickTimeTable, StoreGrid,
    TicketLine, PICK_TIERS, TIMESTAMP_FORMAT,
};

const DELIMITER: char = ';';

/// Locations of the four input tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    pub planogram: PathBuf,
    pub customers: PathBuf,
    pub pick_times: PathBuf,
    pub tickets: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            planogram: PathBuf::from("data/planogram_table.csv"),
            customers: PathBuf::from("data/customers_properties.csv"),
            pick_times: PathBuf::from("data/article_picking_time.csv"),
            tickets: PathBuf::from("data/tickets.csv"),
        }
    }
}

/// Everything loaded before simulation starts
#[derive(Debug, Clone)]
pub struct StoreData {
    pub grid: StoreGrid,
    pub profiles: Vec<CustomerProfile>,
    pub catalog: PickTimeCatalog,
    pub tickets: Vec<TicketLine>,
}

/// Loads and validates all input tables
pub fn load_store_data(paths: &InputPaths) -> RunResult<StoreData> {
    let entries = parse_planogram(&paths.planogram.display().to_string(), &read(&paths.planogram)?)?;
    let grid = StoreGrid::from_entries(&entries)?;
    info!(
        width = grid.width(),
        height = grid.height(),
        exits = grid.exits().len(),
        articles = grid.pickups().len(),
        "loaded planogram"
    );

    let profiles =
        parse_customer_profiles(&paths.customers.display().to_string(), &read(&paths.customers)?)?;
    info!("Loaded {} customer profiles", profiles.len());

    let catalog =
        parse_pick_times(&paths.pick_times.display().to_string(), &read(&paths.pick_times)?)?;
    info!("Loaded {} pick-time tables", catalog.len());

    let tickets = parse_tickets(&paths.tickets.display().to_string(), &read(&paths.tickets)?)?;
    info!("Loaded {} ticket lines", tickets.len());

    Ok(StoreData {
        grid,
        profiles,
        catalog,
        tickets,
    })
}

fn read(path: &Path) -> RunResult<String> {
    fs::read_to_string(path).map_err(|source| RunError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Header-addressed view of a `;`-delimited table
struct Table<'a> {
    file: &'a str,
    columns: HashMap<&'a str, usize>,
    rows: Vec<(usize, Vec<&'a str>)>,
}

impl<'a> Table<'a> {
    fn parse(file: &'a str, content: &'a str) -> RunResult<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or_else(|| RunError::MalformedInput {
            file: file.to_string(),
            line: 1,
            reason: "missing header row".into(),
        })?;
        let columns = header
            .trim_start_matches('\u{feff}')
            .split(DELIMITER)
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect();

        let rows = lines
            .map(|(number, line)| (number, line.split(DELIMITER).map(str::trim).collect()))
            .collect();

        Ok(Self {
            file,
            columns,
            rows,
        })
    }

    fn malformed(&self, line: usize, reason: String) -> RunError {
        RunError::MalformedInput {
            file: self.file.to_string(),
            line,
            reason,
        }
    }

    fn require_columns(&self, names: &[&str]) -> RunResult<()> {
        match names.iter().find(|name| !self.columns.contains_key(**name)) {
            Some(name) => Err(self.malformed(1, format!("missing column '{}'", name))),
            None => Ok(()),
        }
    }

    /// Raw field; an absent trailing field reads as empty
    fn field(&self, row: &[&'a str], name: &str) -> &'a str {
        self.columns
            .get(name)
            .and_then(|&i| row.get(i))
            .copied()
            .unwrap_or("")
    }

    fn parse_field<T: FromStr>(&self, line: usize, row: &[&'a str], name: &str) -> RunResult<T> {
        let raw = self.field(row, name);
        raw.parse::<T>()
            .map_err(|_| self.malformed(line, format!("invalid {} '{}'", name, raw)))
    }

    fn required_text(&self, line: usize, row: &[&'a str], name: &str) -> RunResult<String> {
        let raw = self.field(row, name);
        if raw.is_empty() {
            Err(self.malformed(line, format!("empty {}", name)))
        } else {
            Ok(raw.to_string())
        }
    }
}

/// Maps a planogram description to a cell role.
///
/// Aisle keywords are accepted in the store's Spanish labels or in English;
/// any other description names the article stocked on that shelf.
fn layout_role(description: &str, pickup: Option<Cell>) -> LayoutRole {
    match description {
        "paso" | "walkable" => LayoutRole::Walkable,
        "paso-entrada" | "entrance" => LayoutRole::Entrance,
        "paso-salida" | "exit" => LayoutRole::Exit,
        "" | "obstacle" => LayoutRole::Obstacle,
        article => match pickup {
            Some(pickup) => LayoutRole::Shelf {
                article: article.to_string(),
                pickup,
            },
            None => LayoutRole::Obstacle,
        },
    }
}

/// Parses `x;y;picking_x;picking_y;description`
pub fn parse_planogram(file: &str, content: &str) -> RunResult<Vec<LayoutEntry>> {
    let table = Table::parse(file, content)?;
    table.require_columns(&["x", "y", "picking_x", "picking_y", "description"])?;

    let mut entries = Vec::with_capacity(table.rows.len());
    for (line, row) in &table.rows {
        let cell = Cell::new(
            table.parse_field(*line, row, "x")?,
            table.parse_field(*line, row, "y")?,
        );
        let pickup = match (table.field(row, "picking_x"), table.field(row, "picking_y")) {
            ("", "") => None,
            _ => Some(Cell::new(
                table.parse_field(*line, row, "picking_x")?,
                table.parse_field(*line, row, "picking_y")?,
            )),
        };
        let role = layout_role(table.field(row, "description"), pickup);
        entries.push(LayoutEntry::new(cell, role));
    }

    Ok(entries)
}

/// Parses `customer_id;step_seconds`
pub fn parse_customer_profiles(file: &str, content: &str) -> RunResult<Vec<CustomerProfile>> {
    let table = Table::parse(file, content)?;
    table.require_columns(&["customer_id", "step_seconds"])?;

    table
        .rows
        .iter()
        .map(|(line, row)| {
            Ok(CustomerProfile::new(
                table.required_text(*line, row, "customer_id")?,
                table.parse_field(*line, row, "step_seconds")?,
            ))
        })
        .collect()
}

/// Parses `article_id;first_pick;second_pick;third_pick;fourth_pick;fifth_more_pick`
pub fn parse_pick_times(file: &str, content: &str) -> RunResult<PickTimeCatalog> {
    const TIER_COLUMNS: [&str; PICK_TIERS] = [
        "first_pick",
        "second_pick",
        "third_pick",
        "fourth_pick",
        "fifth_more_pick",
    ];

    let table = Table::parse(file, content)?;
    table.require_columns(&["article_id"])?;
    table.require_columns(&TIER_COLUMNS)?;

    let mut catalog = PickTimeCatalog::new();
    for (line, row) in &table.rows {
        let mut tiers = [0; PICK_TIERS];
        for (tier, column) in tiers.iter_mut().zip(TIER_COLUMNS) {
            *tier = table.parse_field(*line, row, column)?;
        }
        catalog.insert(
            table.required_text(*line, row, "article_id")?,
            PickTimeTable::new(tiers),
        );
    }

    Ok(catalog)
}

/// Parses `enter_date_time;customer_id;article_id;quantity;ticket_id`
pub fn parse_tickets(file: &str, content: &str) -> RunResult<Vec<TicketLine>> {
    let table = Table::parse(file, content)?;
    table.require_columns(&[
        "enter_date_time",
        "customer_id",
        "article_id",
        "quantity",
        "ticket_id",
    ])?;

    table
        .rows
        .iter()
        .map(|(line, row)| {
            let raw_time = table.field(row, "enter_date_time");
            let entered_at = NaiveDateTime::parse_from_str(raw_time, TIMESTAMP_FORMAT)
                .map_err(|e| table.malformed(*line, format!("invalid enter_date_time '{}': {}", raw_time, e)))?;

            Ok(TicketLine {
                entered_at,
                customer_id: table.required_text(*line, row, "customer_id")?,
                article_id: table.required_text(*line, row, "article_id")?,
                quantity: table.parse_field(*line, row, "quantity")?,
                ticket_id: table.required_text(*line, row, "ticket_id")?,
            })
        })
        .collect()
}
