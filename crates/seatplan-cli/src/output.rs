//! Output formatting module

use seatplan_domain::model::{Fleet, Group, Plan, Student};
use seatplan_infra::RowIssue;
use seatplan_types::{OutputFormat, Result};

pub fn output_issues(issues: &[RowIssue]) {
    for issue in issues {
        eprintln!("Warning: {}", issue);
    }
}

pub fn output_roster(output_format: OutputFormat, students: &[Student]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(students)?);
        return Ok(());
    }

    println!("\nRoster ({} students)", students.len());
    println!("{}", "=".repeat(60));
    println!("{:<8} {:<28} {}", "ID", "Name", "Address");
    for student in students {
        println!("{:<8} {:<28} {}", student.id, student.name, student.address);
    }
    Ok(())
}

/// Print one group with its members in pickup order
pub fn print_group(group: &Group) {
    println!("\n{}", group.label());
    if group.is_over_capacity() {
        println!("  ! over capacity");
    }
    for (stop, student) in group.students.iter().enumerate() {
        println!("  {:>2}. [{}] {} - {}", stop + 1, student.id, student.name, student.address);
    }
}

pub fn output_plan(output_format: OutputFormat, plan: &Plan) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    println!("\nSeating Plan");
    println!("============");
    println!("Strategy: {}", plan.strategy);
    println!("Created:  {}", plan.created_at.format("%Y-%m-%d %H:%M"));
    println!(
        "Students: {} in {} groups",
        plan.student_count(),
        plan.non_empty_groups().count()
    );

    for group in plan.non_empty_groups() {
        print_group(group);
    }
    Ok(())
}

pub fn output_fleet(output_format: OutputFormat, fleet: &Fleet) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(fleet.vehicles())?);
        return Ok(());
    }

    println!("\nFleet");
    println!("=====");
    for (idx, vehicle) in fleet.vehicles().iter().enumerate() {
        println!("Group {:>2}: {:<20} {:>3} seats", idx + 1, vehicle.name, vehicle.capacity);
    }
    println!("Total capacity: {}", fleet.total_capacity());
    Ok(())
}
