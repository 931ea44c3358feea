//! Static translation of device exercise category codes to display labels.

/// Maps a numeric exercise category code to a human-readable name. Unknown
/// codes render as "Exercise (Type N)".
pub fn exercise_type_name(exercise_type: i32) -> String {
    let name = match exercise_type {
        // Most common exercises reported by entry-level watches
        79 => "Walking",
        80 => "Running",
        8 => "Cycling",
        73 => "Swimming",
        77 => "Yoga",
        56 => "Weightlifting",

        // Additional exercises reported by advanced watches
        2 => "Badminton",
        5 => "Basketball",
        7 => "Biking",
        9 => "Calisthenics",
        11 => "Dancing",
        12 => "Elliptical",
        13 => "Exercise Class",
        16 => "Football (American)",
        17 => "Football (Australian)",
        18 => "Football (Soccer)",
        20 => "Frisbee",
        23 => "Golf",
        24 => "Guided Breathing",
        25 => "Gymnastics",
        26 => "Handball",
        27 => "High Intensity Interval Training",
        28 => "Hiking",
        29 => "Ice Hockey",
        30 => "Ice Skating",
        32 => "Martial Arts",
        33 => "Meditation",
        36 => "Paddling",
        37 => "Paragliding",
        38 => "Pilates",
        40 => "Racquetball",
        41 => "Rock Climbing",
        42 => "Roller Hockey",
        43 => "Rowing",
        44 => "Rowing Machine",
        45 => "Rugby",
        46 => "Running (Treadmill)",
        48 => "Sailing",
        49 => "Scuba Diving",
        50 => "Skating",
        51 => "Skiing",
        52 => "Snowboarding",
        53 => "Snowshoeing",
        54 => "Squash",
        55 => "Stair Climbing",
        57 => "Strength Training",
        58 => "Stretching",
        59 => "Surfing",
        61 => "Table Tennis",
        62 => "Tennis",
        64 => "Volleyball",
        65 => "Water Polo",

        other => return format!("Exercise (Type {})", other),
    };
    name.to_string()
}
