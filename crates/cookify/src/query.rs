/// Pure filtering helpers over the in-memory recipe list.
use crate::model::Recipe;

/// Look a recipe up by its unique id.
pub fn get_by_id<'a>(recipes: &'a [Recipe], id: &str) -> Option<&'a Recipe> {
    recipes.iter().find(|r| r.id == id)
}

/// Recipes whose total time is known and at most `max` minutes. Recipes
/// without a listed time never match, whatever the bound.
pub fn by_max_minutes(recipes: &[Recipe], max: u32) -> Vec<&Recipe> {
    recipes
        .iter()
        .filter(|r| r.total_minutes.is_some_and(|m| m <= max))
        .collect()
}

/// Recipes whose trimmed title starts with `letter`, case-insensitively.
pub fn by_first_letter(recipes: &[Recipe], letter: char) -> Vec<&Recipe> {
    recipes
        .iter()
        .filter(|r| {
            r.title
                .trim()
                .chars()
                .next()
                .is_some_and(|c| c.to_uppercase().eq(letter.to_uppercase()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: &str, title: &str, total_minutes: Option<u32>) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            total_minutes,
            ..Recipe::default()
        }
    }

    #[test]
    fn by_max_minutes_excludes_missing_durations() {
        let recipes = vec![
            recipe("a", "Alfajores", Some(45)),
            recipe("b", "Brazo de Reina", None),
            recipe("c", "Calzones Rotos", Some(30)),
        ];
        let quick = by_max_minutes(&recipes, 60);
        let ids: Vec<&str> = quick.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        // a missing duration never matches, even with a huge bound
        assert!(by_max_minutes(&recipes, u32::MAX)
            .iter()
            .all(|r| r.id != "b"));
    }

    #[test]
    fn by_max_minutes_bound_is_inclusive() {
        let recipes = vec![recipe("a", "Alfajores", Some(45))];
        assert_eq!(by_max_minutes(&recipes, 45).len(), 1);
        assert_eq!(by_max_minutes(&recipes, 44).len(), 0);
    }

    #[test]
    fn by_first_letter_is_case_insensitive_and_trims() {
        let recipes = vec![
            recipe("a", "  cachitos de Manjar", None),
            recipe("b", "Charquicán", None),
            recipe("c", "Empanadas", None),
        ];
        let ids: Vec<&str> = by_first_letter(&recipes, 'c')
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(by_first_letter(&recipes, 'E').len(), 1);
    }

    #[test]
    fn by_first_letter_skips_blank_titles() {
        let recipes = vec![recipe("a", "   ", None)];
        assert!(by_first_letter(&recipes, 'A').is_empty());
    }

    #[test]
    fn get_by_id_finds_exact_match() {
        let recipes = vec![recipe("porotos-granados", "Porotos Granados", None)];
        assert!(get_by_id(&recipes, "porotos-granados").is_some());
        assert!(get_by_id(&recipes, "porotos").is_none());
    }
}
