pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_vault_memberships.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_vault_memberships.sql")),
				"tables/002_seeds.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_seeds.sql")),
				"tables/003_seed_views.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_seed_views.sql")),
				"tables/004_seed_media.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_seed_media.sql")),
				"tables/005_memories.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_memories.sql")),
				"tables/006_memory_media.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_memory_media.sql")),
				"tables/007_journals.sql" =>
					out.push_str(include_str!("../../../sql/tables/007_journals.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
