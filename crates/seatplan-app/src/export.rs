//! Excel export functionality
//!
//! The "Groups" sheet has one column per non-empty group: label in row 0,
//! directions link in row 1, student names from row 2 down in pickup order.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use seatplan_domain::model::{Group, Plan};
use seatplan_types::{Error, Result};

use crate::config::Config;
use crate::routing::group_route_url;

/// Excel refuses hyperlinks longer than this
const MAX_EXCEL_URL_LEN: usize = 2079;

/// One exported group column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupColumn {
    pub label: String,
    pub link: String,
    pub names: Vec<String>,
}

impl GroupColumn {
    /// Cell values top to bottom
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.label.clone(), self.link.clone()];
        cells.extend(self.names.iter().cloned());
        cells
    }

    /// Rebuild a column from its cell values
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        let (label, rest) = cells.split_first()?;
        let (link, names) = rest.split_first()?;
        Some(Self {
            label: label.clone(),
            link: link.clone(),
            names: names.iter().filter(|n| !n.is_empty()).cloned().collect(),
        })
    }
}

/// Columns for every non-empty group, in plan order
pub fn build_columns(groups: &[Group], config: &Config) -> Result<Vec<GroupColumn>> {
    groups
        .iter()
        .filter(|g| !g.is_empty())
        .map(|g| {
            Ok(GroupColumn {
                label: g.label(),
                link: group_route_url(g, config)?.unwrap_or_default(),
                names: g.students.iter().map(|s| s.name.clone()).collect(),
            })
        })
        .collect()
}

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Export a plan to an Excel file
pub fn export_to_excel(plan: &Plan, config: &Config, output_path: &Path) -> Result<()> {
    let columns = build_columns(&plan.groups, config)?;
    let mut workbook = Workbook::new();

    let groups_sheet = workbook.add_worksheet();
    write_groups_sheet(groups_sheet, &columns)?;

    let details_sheet = workbook.add_worksheet();
    write_details_sheet(details_sheet, plan)?;

    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, plan)?;

    workbook.save(output_path).map_err(xlsx_err)?;
    tracing::info!(path = %output_path.display(), groups = columns.len(), "plan exported");

    Ok(())
}

fn write_groups_sheet(sheet: &mut Worksheet, columns: &[GroupColumn]) -> Result<()> {
    sheet.set_name("Groups").map_err(xlsx_err)?;
    let header_format = Format::new().set_bold();

    for (idx, column) in columns.iter().enumerate() {
        let col = idx as u16;
        sheet
            .write_string_with_format(0, col, &column.label, &header_format)
            .map_err(xlsx_err)?;

        if column.link.len() <= MAX_EXCEL_URL_LEN {
            sheet.write_url(1, col, column.link.as_str()).map_err(xlsx_err)?;
        } else {
            tracing::warn!(group = %column.label, len = column.link.len(), "route link too long for a hyperlink");
            sheet.write_string(1, col, &column.link).map_err(xlsx_err)?;
        }

        for (offset, name) in column.names.iter().enumerate() {
            sheet
                .write_string(2 + offset as u32, col, name)
                .map_err(xlsx_err)?;
        }
        sheet.set_column_width(col, 32).map_err(xlsx_err)?;
    }

    Ok(())
}

fn write_details_sheet(sheet: &mut Worksheet, plan: &Plan) -> Result<()> {
    sheet.set_name("Details").map_err(xlsx_err)?;
    let header_format = Format::new().set_bold();

    let headers = ["Group", "Vehicle", "Stop", "ID", "Name", "Address", "Pickup times"];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_err)?;
    }

    let mut row = 1u32;
    for group in plan.non_empty_groups() {
        for (stop, student) in group.students.iter().enumerate() {
            sheet.write_number(row, 0, group.group_id as f64).map_err(xlsx_err)?;
            sheet.write_string(row, 1, &group.vehicle).map_err(xlsx_err)?;
            sheet.write_number(row, 2, (stop + 1) as f64).map_err(xlsx_err)?;
            sheet.write_string(row, 3, &student.id).map_err(xlsx_err)?;
            sheet.write_string(row, 4, &student.name).map_err(xlsx_err)?;
            sheet.write_string(row, 5, &student.address).map_err(xlsx_err)?;
            sheet
                .write_string(row, 6, &student.pickup.summary())
                .map_err(xlsx_err)?;
            row += 1;
        }
    }

    sheet.set_column_width(1, 20).map_err(xlsx_err)?;
    sheet.set_column_width(4, 28).map_err(xlsx_err)?;
    sheet.set_column_width(5, 40).map_err(xlsx_err)?;
    sheet.set_column_width(6, 50).map_err(xlsx_err)?;

    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, plan: &Plan) -> Result<()> {
    sheet.set_name("Summary").map_err(xlsx_err)?;
    let header_format = Format::new().set_bold();

    sheet
        .write_string_with_format(0, 0, "Seating Plan", &header_format)
        .map_err(xlsx_err)?;

    sheet.write_string(2, 0, "Created:").map_err(xlsx_err)?;
    sheet
        .write_string(2, 1, &plan.created_at.to_rfc3339())
        .map_err(xlsx_err)?;

    sheet.write_string(3, 0, "Strategy:").map_err(xlsx_err)?;
    sheet
        .write_string(3, 1, &plan.strategy.to_string())
        .map_err(xlsx_err)?;

    sheet.write_string(4, 0, "Groups:").map_err(xlsx_err)?;
    sheet
        .write_number(4, 1, plan.non_empty_groups().count() as f64)
        .map_err(xlsx_err)?;

    sheet.write_string(5, 0, "Students:").map_err(xlsx_err)?;
    sheet
        .write_number(5, 1, plan.student_count() as f64)
        .map_err(xlsx_err)?;

    sheet.set_column_width(0, 14).map_err(xlsx_err)?;
    sheet.set_column_width(1, 34).map_err(xlsx_err)?;

    Ok(())
}
