use crate::config::CategoryConfig;

type ChildEntry = (&'static str, &'static str, &'static [&'static str]);

// (id, name, icon, score, children)
const TABLE: &[(&str, &str, &str, i32, &[ChildEntry])] = &[
    (
        "create",
        "Create",
        "applications-graphics-symbolic",
        100,
        &[
            ("graphics", "Graphics & Photography", &["Graphics", "Photography"]),
            ("audio-video", "Audio & Video", &["AudioVideo", "AudioVideoEditing"]),
            ("publishing", "Publishing", &["Publishing", "Art"]),
        ],
    ),
    (
        "work",
        "Work",
        "system-file-manager-symbolic",
        90,
        &[
            ("office", "Office", &["Office", "WordProcessor", "Spreadsheet"]),
            ("finance", "Finance", &["Finance", "Economy"]),
            ("text-editors", "Text Editors", &["TextEditor"]),
        ],
    ),
    (
        "play",
        "Play",
        "applications-games-symbolic",
        80,
        &[
            ("action", "Action", &["ActionGame", "ArcadeGame"]),
            ("puzzles", "Puzzles", &["LogicGame", "BoardGame"]),
            ("strategy", "Strategy", &["StrategyGame"]),
        ],
    ),
    (
        "socialize",
        "Socialize",
        "user-available-symbolic",
        70,
        &[
            ("chat", "Chat", &["Chat", "InstantMessaging", "IRCClient"]),
            ("email", "Email", &["Email"]),
        ],
    ),
    (
        "learn",
        "Learn",
        "accessories-dictionary-symbolic",
        60,
        &[
            ("science", "Science", &["Science", "Astronomy", "Chemistry"]),
            ("languages", "Languages", &["Languages"]),
        ],
    ),
    (
        "develop",
        "Develop",
        "applications-engineering-symbolic",
        50,
        &[
            ("ide", "IDEs", &["IDE", "GUIDesigner"]),
            ("debuggers", "Debuggers", &["Debugger", "Profiling"]),
        ],
    ),
];

/// The built-in category tree.
///
/// Every top-level category gets `featured` and `all` children besides its
/// own; `all` matches the union of the ordinary children's groups.
pub(crate) fn default_categories() -> Vec<CategoryConfig> {
    TABLE
        .iter()
        .map(|(id, name, icon, score, children)| {
            let mut all_groups: Vec<String> = Vec::new();
            let mut entries: Vec<CategoryConfig> = Vec::new();

            for (child_id, child_name, groups) in children.iter() {
                let groups: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
                all_groups.extend(groups.iter().cloned());
                entries.push(leaf(child_id, Some(*child_name), groups));
            }

            let featured_groups = all_groups
                .iter()
                .map(|g| format!("{}::Featured", g))
                .collect();
            entries.push(leaf("featured", None, featured_groups));
            entries.push(leaf("all", None, all_groups));

            CategoryConfig {
                id: id.to_string(),
                name: Some(name.to_string()),
                icon: Some(icon.to_string()),
                score: *score,
                desktop_groups: Vec::new(),
                children: entries,
            }
        })
        .collect()
}

fn leaf(id: &str, name: Option<&str>, desktop_groups: Vec<String>) -> CategoryConfig {
    CategoryConfig {
        id: id.to_string(),
        name: name.map(str::to_string),
        icon: None,
        score: 0,
        desktop_groups,
        children: Vec::new(),
    }
}
