//! Grouping prompt
//!
//! The prompt lists the fleet, states the capacity and proximity rules, embeds
//! one text line per student and pins the reply to a single JSON object.

use seatplan_domain::model::{Fleet, Student};

/// JSON shape the model must reply with
const REPLY_SCHEMA: &str = r#"{
    "groups": [
        {
            "group_id": 1,
            "vehicle": "<vehicle name>",
            "capacity": <vehicle capacity>,
            "students": [
                {
                    "id": "<student id>",
                    "name": "<student name>",
                    "address": "<student address>",
                    "pickup_time": "<pickup time>"
                }
            ]
        }
    ]
}"#;

/// One roster line as the model sees it
pub fn format_student_line(student: &Student) -> String {
    let times = student
        .pickup
        .entries()
        .iter()
        .map(|(day, time)| format!("{}: {}", day, time))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "ID: {}, Name: {}, Address: {}, Pickup times: {}.",
        student.id, student.name, student.address, times
    )
}

pub fn format_students(students: &[Student]) -> String {
    students
        .iter()
        .map(format_student_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_fleet(fleet: &Fleet) -> String {
    fleet
        .vehicles()
        .iter()
        .enumerate()
        .map(|(idx, v)| format!("- **Group {}**: {} - capacity {} students", idx + 1, v.name, v.capacity))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the full grouping prompt for one batch
pub fn build_grouping_prompt(batch: &[Student], fleet: &Fleet) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are an assistant specializing in geolocation and route optimization.\n\n",
    );
    prompt.push_str(&format!(
        "Given the following student data and vehicle capacities, divide the students into {} groups, \
         each assigned to a specific vehicle. The total number of students in each group must not exceed \
         the vehicle's capacity, and students in each group should be geographically close to one another \
         to keep the route short.\n\n",
        fleet.len()
    ));

    prompt.push_str(&format!(
        "Rules:\n\n1. There are exactly {} groups, each assigned to a specific vehicle with a given capacity:\n\n",
        fleet.len()
    ));
    prompt.push_str(&format_fleet(fleet));
    prompt.push_str(
        "\n\n2. Assign students to the groups so that:\n\
         - The number of students in each group does not exceed the vehicle's capacity.\n\
         - Students in each group are geographically close to each other.\n\n\
         3. Estimate distances between student addresses and group them to minimize the total travel distance of each group.\n\n\
         4. Every student must appear in exactly one group. Keep each student's id exactly as given.\n\n",
    );

    prompt.push_str("Input Data:\n");
    prompt.push_str(&format_students(batch));
    prompt.push_str("\n\nYour response must be a valid JSON object:\n\n");
    prompt.push_str(REPLY_SCHEMA);
    prompt.push_str("\n\nIMPORTANT: Provide only the JSON object as your response.");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_domain::model::WeekdayPickups;

    fn student() -> Student {
        Student::new(1, "5", "Anna Nowak", "ul. Lipowa 1, Krakow").with_pickup(WeekdayPickups {
            monday: "14:30".to_string(),
            tuesday: "15:00".to_string(),
            wednesday: "14:30".to_string(),
            thursday: "13:45".to_string(),
            friday: "12:00".to_string(),
        })
    }

    #[test]
    fn test_format_student_line() {
        assert_eq!(
            format_student_line(&student()),
            "ID: 1_5, Name: Anna Nowak, Address: ul. Lipowa 1, Krakow, Pickup times: \
             Monday: 14:30, Tuesday: 15:00, Wednesday: 14:30, Thursday: 13:45, Friday: 12:00."
        );
    }

    #[test]
    fn test_prompt_lists_every_vehicle() {
        let prompt = build_grouping_prompt(&[student()], &Fleet::standard());
        assert!(prompt.contains("divide the students into 10 groups"));
        assert!(prompt.contains("- **Group 1**: Mercedes Sprinter - capacity 19 students"));
        assert!(prompt.contains("- **Group 10**: Mercedes Elektryk - capacity 7 students"));
    }

    #[test]
    fn test_prompt_embeds_students_and_schema() {
        let prompt = build_grouping_prompt(&[student()], &Fleet::standard());
        assert!(prompt.contains("ID: 1_5, Name: Anna Nowak"));
        assert!(prompt.contains("\"pickup_time\""));
        assert!(prompt.ends_with("Provide only the JSON object as your response."));
    }
}
