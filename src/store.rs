//! Workbook access: the trip sheet and, for the persisted registry, the `Users` sheet.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Mutex, PoisonError},
};

use calamine::{open_workbook, Data, DataType, Range, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::{
    error::PortalError,
    models::{distinct_profiles, Dataset, Sex, TripRecord, UserProfile},
};

pub const TRIP_COLUMNS: [&str; 12] = [
    "payUserID",
    "typeCard",
    "userName",
    "userSex",
    "userBirthYear",
    "transID",
    "routeID",
    "routeName",
    "corridorName",
    "transDate",
    "duration",
    "direction",
];

pub const PROFILE_COLUMNS: [&str; 5] = [
    "payUserID",
    "typeCard",
    "userName",
    "userSex",
    "userBirthYear",
];

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const EXCEL_DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Where the user profiles come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryVariant {
    /// Profiles are de-duplicated from the trip sheet; registrations live in the session only.
    Derived,
    /// Profiles come from the `Users` sheet and registrations are written back to it.
    Persisted,
}

impl FromStr for RegistryVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "derived" | "a" => Ok(RegistryVariant::Derived),
            "persisted" | "b" => Ok(RegistryVariant::Persisted),
            other => Err(format!("unknown registry variant `{}`", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub workbook: PathBuf,
    pub trip_sheet: String,
    pub users_sheet: String,
    pub variant: RegistryVariant,
}

#[derive(Debug)]
pub struct TabularStore {
    config: StoreConfig,
    // one workbook rewrite at a time within this process
    write_lock: Mutex<()>,
}

impl TabularStore {
    pub fn new(config: StoreConfig) -> Self {
        TabularStore {
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn variant(&self) -> RegistryVariant {
        self.config.variant
    }

    fn path_str(&self) -> String {
        self.config.workbook.display().to_string()
    }

    pub fn load(&self) -> Result<Dataset, PortalError> {
        let mut workbook: Xlsx<_> = open_workbook(&self.config.workbook)
            .map_err(|e| PortalError::data_load(self.path_str(), e))?;

        let range = workbook
            .worksheet_range(&self.config.trip_sheet)
            .map_err(|e| {
                PortalError::data_load(
                    self.path_str(),
                    format!("sheet `{}`: {}", self.config.trip_sheet, e),
                )
            })?;
        let (trips, profiles) = parse_trips(&range, &self.config.trip_sheet)
            .map_err(|reason| PortalError::data_load(self.path_str(), reason))?;

        let users = match self.config.variant {
            RegistryVariant::Derived => distinct_profiles(profiles),
            RegistryVariant::Persisted => match self.load_registry(&mut workbook) {
                Ok(users) => users,
                Err(reason) => {
                    tracing::warn!(
                        "{} unavailable ({}), deriving profiles from trips",
                        self.config.users_sheet,
                        reason
                    );
                    distinct_profiles(profiles)
                }
            },
        };

        tracing::info!(
            "loaded {} trips and {} users from {}",
            trips.len(),
            users.len(),
            self.path_str()
        );

        Ok(Dataset {
            trips: trips.into(),
            users,
        })
    }

    fn load_registry(&self, workbook: &mut Xlsx<std::io::BufReader<fs::File>>) -> Result<Vec<UserProfile>, String> {
        let range = workbook
            .worksheet_range(&self.config.users_sheet)
            .map_err(|e| e.to_string())?;
        parse_profiles(&range, &self.config.users_sheet)
    }

    /// Replaces the users sheet with `profiles`, keeping the other sheets' values.
    ///
    /// The new workbook is written next to the old one and renamed over it, so a
    /// failed write leaves the previous file in place. Cell formatting of the
    /// other sheets is not carried over, only their values.
    pub fn persist_users(&self, profiles: &[UserProfile]) -> Result<(), PortalError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let sheets = self.read_all_sheets()?;

        let mut workbook = Workbook::new();
        let mut wrote_users = false;
        for (name, range) in &sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).map_err(persist_error)?;
            if *name == self.config.users_sheet {
                write_profiles(worksheet, profiles).map_err(persist_error)?;
                wrote_users = true;
            } else {
                copy_range(worksheet, range).map_err(persist_error)?;
            }
        }
        if !wrote_users {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&self.config.users_sheet)
                .map_err(persist_error)?;
            write_profiles(worksheet, profiles).map_err(persist_error)?;
        }

        let tmp_path = temp_path(&self.config.workbook);
        workbook.save(&tmp_path).map_err(persist_error)?;
        fs::rename(&tmp_path, &self.config.workbook).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            PortalError::Persist(e.to_string())
        })?;

        tracing::info!(
            "wrote {} profiles to {}!{}",
            profiles.len(),
            self.path_str(),
            self.config.users_sheet
        );
        Ok(())
    }

    fn read_all_sheets(&self) -> Result<Vec<(String, Range<Data>)>, PortalError> {
        let mut workbook: Xlsx<_> = open_workbook(&self.config.workbook)
            .map_err(|e: calamine::XlsxError| PortalError::Persist(e.to_string()))?;

        workbook
            .sheet_names()
            .into_iter()
            .map(|name| {
                workbook
                    .worksheet_range(&name)
                    .map(|range| (name.clone(), range))
                    .map_err(|e| PortalError::Persist(format!("sheet `{}`: {}", name, e)))
            })
            .collect()
    }
}

fn persist_error(e: XlsxError) -> PortalError {
    PortalError::Persist(e.to_string())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Column positions of a sheet, read from its first row.
struct Header(HashMap<String, usize>);

impl Header {
    fn parse(range: &Range<Data>, sheet: &str, required: &[&str]) -> Result<Header, String> {
        let first = range
            .rows()
            .next()
            .ok_or_else(|| format!("sheet `{}` is empty", sheet))?;
        let columns = first
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell_text(cell).map(|name| (name, i)))
            .collect::<HashMap<_, _>>();

        let missing = required
            .iter()
            .filter(|c| !columns.contains_key(**c))
            .copied()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(format!(
                "sheet `{}` is missing column(s) {}",
                sheet,
                missing.join(", ")
            ));
        }

        Ok(Header(columns))
    }

    fn text(&self, row: &[Data], column: &str) -> Option<String> {
        self.0
            .get(column)
            .and_then(|&i| row.get(i))
            .and_then(cell_text)
    }
}

/// Text form of a cell. Whole numbers lose their `.0` so numeric ids read as
/// `"123456789012"`; blank cells are `None`.
pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{:.0}", f)),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(
            cell.as_datetime()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

fn profile_from_row(header: &Header, row: &[Data]) -> Result<Option<UserProfile>, String> {
    let pay_user_id = match header.text(row, "payUserID") {
        Some(id) => id,
        None => return Ok(None),
    };

    let user_sex = header
        .text(row, "userSex")
        .ok_or_else(|| format!("user {} has no userSex", pay_user_id))?
        .parse::<Sex>()
        .map_err(|e| format!("user {}: {}", pay_user_id, e))?;
    let user_birth_year = header
        .text(row, "userBirthYear")
        .and_then(|y| y.parse::<i32>().ok())
        .ok_or_else(|| format!("user {} has no valid userBirthYear", pay_user_id))?;

    Ok(Some(UserProfile {
        type_card: header.text(row, "typeCard").unwrap_or_default(),
        user_name: header.text(row, "userName").unwrap_or_default(),
        pay_user_id,
        user_sex,
        user_birth_year,
    }))
}

/// Every row becomes a trip. A row whose profile cells are blank or unreadable
/// still counts as a trip but contributes no profile.
fn parse_trips(range: &Range<Data>, sheet: &str) -> Result<(Vec<TripRecord>, Vec<UserProfile>), String> {
    let header = Header::parse(range, sheet, &TRIP_COLUMNS)?;

    let mut trips = Vec::new();
    let mut profiles = Vec::new();
    let mut anonymous = 0usize;
    for (line, row) in range.rows().enumerate().skip(1) {
        match profile_from_row(&header, row) {
            Ok(Some(profile)) => profiles.push(profile),
            Ok(None) => anonymous += 1,
            Err(e) => {
                tracing::warn!("sheet `{}` row {}: {}, profile skipped", sheet, line + 1, e);
            }
        }

        trips.push(TripRecord {
            trans_id: header.text(row, "transID").unwrap_or_default(),
            pay_user_id: header.text(row, "payUserID").unwrap_or_default(),
            route_id: header.text(row, "routeID").unwrap_or_default(),
            route_name: header.text(row, "routeName"),
            corridor_name: header.text(row, "corridorName"),
            trans_date: header.text(row, "transDate").unwrap_or_default(),
            duration: header.text(row, "duration").unwrap_or_default(),
            direction: header.text(row, "direction").unwrap_or_default(),
        });
    }

    if anonymous > 0 {
        tracing::warn!("{} rows of `{}` have no payUserID", anonymous, sheet);
    }

    Ok((trips, profiles))
}

fn parse_profiles(range: &Range<Data>, sheet: &str) -> Result<Vec<UserProfile>, String> {
    let header = Header::parse(range, sheet, &PROFILE_COLUMNS)?;

    let mut profiles = Vec::new();
    for (line, row) in range.rows().enumerate().skip(1) {
        if let Some(profile) = profile_from_row(&header, row)
            .map_err(|e| format!("sheet `{}` row {}: {}", sheet, line + 1, e))?
        {
            profiles.push(profile);
        }
    }

    Ok(distinct_profiles(profiles))
}

fn write_profiles(worksheet: &mut Worksheet, profiles: &[UserProfile]) -> Result<(), XlsxError> {
    for (col, name) in PROFILE_COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (i, p) in profiles.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, &p.pay_user_id)?;
        worksheet.write_string(row, 1, &p.type_card)?;
        worksheet.write_string(row, 2, &p.user_name)?;
        worksheet.write_string(row, 3, p.user_sex.code())?;
        worksheet.write_number(row, 4, p.user_birth_year)?;
    }

    Ok(())
}

fn copy_range(worksheet: &mut Worksheet, range: &Range<Data>) -> Result<(), XlsxError> {
    let (start_row, start_col) = match range.start() {
        Some(start) => start,
        None => return Ok(()),
    };
    let date_format = Format::new().set_num_format(EXCEL_DATE_FORMAT);

    for (r, c, cell) in range.cells() {
        let row = start_row + r as u32;
        let col = (start_col as usize + c) as u16;
        match cell {
            Data::Int(i) => {
                worksheet.write_number(row, col, *i as f64)?;
            }
            Data::Float(f) => {
                worksheet.write_number(row, col, *f)?;
            }
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                worksheet.write_string(row, col, s)?;
            }
            Data::Bool(b) => {
                worksheet.write_boolean(row, col, *b)?;
            }
            Data::DateTime(dt) => {
                worksheet.write_number_with_format(row, col, dt.as_f64(), &date_format)?;
            }
            Data::Error(_) | Data::Empty => {}
        }
    }

    Ok(())
}
