//! Exercise assembly.
//!
//! Turns the file references of one course outline into [`ExerciseEntry`]
//! values: each file is read, classified into content blocks, named, and
//! given its slug and source link. Files that are missing, fail to parse,
//! or carry an over-long name are dropped and reported, never fatal.

use std::path::PathBuf;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use seeder_markdown::{ClassifyOptions, classify};
use seeder_shared::{
    CourseId, CurriculumConfig, Exercise, ExerciseContent, ExerciseEntry, ExerciseFileRef, Result,
};

use crate::catalog::read_text;

/// Suffix removed from file names and slugs.
const MARKDOWN_SUFFIX: &str = ".md";

/// Settings for [`ExerciseAssembler`].
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Curriculum root; exercise paths are relative to it.
    pub root: PathBuf,
    pub classify: ClassifyOptions,
    /// Language tag of each content envelope.
    pub content_lang: String,
    pub github_base_url: String,
    /// Longest accepted exercise name, in characters.
    pub max_name_len: usize,
    /// Maximum files read at once.
    pub concurrency: usize,
}

impl AssembleOptions {
    pub fn new(root: impl Into<PathBuf>, config: &CurriculumConfig) -> Self {
        Self {
            root: root.into(),
            classify: ClassifyOptions::from(config),
            content_lang: config.content_lang.clone(),
            github_base_url: config.github_base_url.clone(),
            max_name_len: config.max_name_len,
            concurrency: config.concurrency.max(1),
        }
    }
}

/// An exercise file left out of the assembled course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedExercise {
    /// Root-relative path of the file.
    pub path: String,
    pub reason: String,
}

/// Assembled entries of one course, plus the files that were left out.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub entries: Vec<ExerciseEntry>,
    pub dropped: Vec<DroppedExercise>,
}

/// Result of loading one exercise file.
enum Loaded {
    Exercise(Exercise),
    Dropped(DroppedExercise),
}

/// Builds exercises from outline references.
#[derive(Debug, Clone)]
pub struct ExerciseAssembler {
    opts: AssembleOptions,
}

impl ExerciseAssembler {
    pub fn new(opts: AssembleOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.opts
    }

    /// Assemble every outline entry of `folder`, keeping outline order.
    ///
    /// Leaf references yield [`ExerciseEntry::Single`]; references with
    /// children yield [`ExerciseEntry::Group`] holding whichever children
    /// loaded. `course_id` is copied onto each exercise and may be absent
    /// for a course the content service does not know yet.
    #[instrument(skip_all, fields(folder = %folder, refs = refs.len()))]
    pub async fn assemble(
        &self,
        folder: &str,
        refs: &[ExerciseFileRef],
        course_id: Option<CourseId>,
    ) -> Assembly {
        let results: Vec<(Option<ExerciseEntry>, Vec<DroppedExercise>)> = stream::iter(refs)
            .map(|file_ref| self.assemble_entry(folder, file_ref, course_id))
            .buffered(self.opts.concurrency)
            .collect()
            .await;

        let mut assembly = Assembly::default();
        for (entry, dropped) in results {
            assembly.entries.extend(entry);
            assembly.dropped.extend(dropped);
        }

        debug!(
            entries = assembly.entries.len(),
            dropped = assembly.dropped.len(),
            "course assembled"
        );
        assembly
    }

    async fn assemble_entry(
        &self,
        folder: &str,
        file_ref: &ExerciseFileRef,
        course_id: Option<CourseId>,
    ) -> (Option<ExerciseEntry>, Vec<DroppedExercise>) {
        let parent = exercise_path(&[folder, file_ref.file_name.as_str()]);

        if file_ref.is_leaf() {
            return match self.load(parent, &file_ref.file_name, course_id).await {
                Loaded::Exercise(exercise) => (Some(ExerciseEntry::Single(exercise)), Vec::new()),
                Loaded::Dropped(dropped) => (None, vec![dropped]),
            };
        }

        let loaded: Vec<Loaded> = stream::iter(&file_ref.child_exercise)
            .map(|child| {
                let path = exercise_path(&[folder, file_ref.file_name.as_str(), child.as_str()]);
                self.load(path, child, course_id)
            })
            .buffered(self.opts.concurrency)
            .collect()
            .await;

        let mut children = Vec::new();
        let mut dropped = Vec::new();
        for result in loaded {
            match result {
                Loaded::Exercise(exercise) => children.push(exercise),
                Loaded::Dropped(item) => dropped.push(item),
            }
        }

        let entry = ExerciseEntry::Group {
            file_name: file_ref.file_name.clone(),
            children,
        };
        (Some(entry), dropped)
    }

    /// Load one file, converting any failure into a drop record.
    async fn load(&self, path: String, file_name: &str, course_id: Option<CourseId>) -> Loaded {
        match self.build_exercise(&path, file_name, course_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(%path, error = %e, "skipping exercise");
                Loaded::Dropped(DroppedExercise {
                    path,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Read and classify one exercise file.
    async fn build_exercise(
        &self,
        path: &str,
        file_name: &str,
        course_id: Option<CourseId>,
    ) -> Result<Loaded> {
        let content = read_text(&self.opts.root.join(path)).await?;
        let doc = classify(&content, &self.opts.classify)?;

        let meta = doc.meta.unwrap_or_default();
        let name = meta
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| file_name.replacen(MARKDOWN_SUFFIX, "", 1));

        // Over-long names are excluded, never truncated.
        let len = name.chars().count();
        if len > self.opts.max_name_len {
            let reason = format!("name is {len} characters, limit is {}", self.opts.max_name_len);
            debug!(%path, %reason, "exercise excluded");
            return Ok(Loaded::Dropped(DroppedExercise {
                path: path.to_string(),
                reason,
            }));
        }

        let envelope = ExerciseContent {
            lang: self.opts.content_lang.clone(),
            exercise: doc.blocks,
        };

        Ok(Loaded::Exercise(Exercise {
            id: None,
            name,
            course_id,
            content: envelope.to_json()?,
            slug: slug_for(path),
            github_link: github_link(&self.opts.github_base_url, path),
            submission_type: meta.submission_type,
        }))
    }
}

// ---------------------------------------------------------------------------
// Path derivation
// ---------------------------------------------------------------------------

/// Join root-relative segments with `/`, removing all whitespace.
pub fn exercise_path(segments: &[&str]) -> String {
    segments
        .join("/")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Slug of a root-relative path: the first `/` becomes `__` and a trailing
/// `.md` is removed.
pub fn slug_for(path: &str) -> String {
    let slug = path.replacen('/', "__", 1);
    match slug.strip_suffix(MARKDOWN_SUFFIX) {
        Some(stripped) => stripped.to_string(),
        None => slug,
    }
}

/// Source link of a root-relative path.
pub fn github_link(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::Path;

    use seeder_shared::FaqMode;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("seeder-assembler-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn assembler(root: &Path) -> ExerciseAssembler {
        ExerciseAssembler::new(AssembleOptions::new(root, &CurriculumConfig::default()))
    }

    #[test]
    fn slug_replaces_first_separator_and_extension() {
        assert_eq!(slug_for("python/intro.md"), "python__intro");
        assert_eq!(slug_for("python/loops/for.md"), "python__loops/for");
        assert_eq!(slug_for("python/loops"), "python__loops");
    }

    #[test]
    fn paths_drop_whitespace() {
        assert_eq!(exercise_path(&["python", "data types.md"]), "python/datatypes.md");
        assert_eq!(
            exercise_path(&["python", "loops ", " for.md"]),
            "python/loops/for.md"
        );
    }

    #[test]
    fn github_link_joins_base_and_path() {
        assert_eq!(
            github_link("https://github.com/org/repo/tree/master/", "python/intro.md"),
            "https://github.com/org/repo/tree/master/python/intro.md"
        );
    }

    #[tokio::test]
    async fn leaf_exercise_is_named_from_meta() {
        let root = temp_dir();
        write(
            &root,
            "python/intro.md",
            "```ngMeta\nname: Getting Started\nsubmission_type: url\n```\n\n# Intro\n\n```python\nprint(1)\n```\n",
        );

        let assembly = assembler(&root)
            .assemble("python", &[ExerciseFileRef::leaf("intro.md")], Some(CourseId(5)))
            .await;

        assert!(assembly.dropped.is_empty());
        let ExerciseEntry::Single(exercise) = &assembly.entries[0] else {
            panic!("expected a single exercise");
        };
        assert_eq!(exercise.name, "Getting Started");
        assert_eq!(exercise.submission_type.as_deref(), Some("url"));
        assert_eq!(exercise.slug, "python__intro");
        assert_eq!(exercise.course_id, Some(CourseId(5)));
        assert_eq!(
            exercise.github_link,
            "https://github.com/navgurukul/newton/tree/master/python/intro.md"
        );

        let content: serde_json::Value = serde_json::from_str(&exercise.content).unwrap();
        assert_eq!(content["lang"], "hi");
        assert_eq!(content["exercise"][0]["type"], "markdown");
        assert_eq!(content["exercise"][1]["type"], "python");

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn name_falls_back_to_file_name() {
        let root = temp_dir();
        write(&root, "python/variables.md", "# Variables\n");

        let assembly = assembler(&root)
            .assemble("python", &[ExerciseFileRef::leaf("variables.md")], None)
            .await;

        assert_eq!(assembly.entries[0].exercises()[0].name, "variables");
        assert_eq!(assembly.entries[0].exercises()[0].course_id, None);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn group_keeps_loaded_children_and_reports_missing_ones() {
        let root = temp_dir();
        write(&root, "python/loops/for.md", "# For\n");

        let refs = [ExerciseFileRef::group(
            "loops",
            vec!["for.md".into(), "while.md".into()],
        )];
        let assembly = assembler(&root).assemble("python", &refs, Some(CourseId(1))).await;

        let ExerciseEntry::Group { file_name, children } = &assembly.entries[0] else {
            panic!("expected a group");
        };
        assert_eq!(file_name, "loops");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].slug, "python__loops/for");
        assert_eq!(assembly.dropped.len(), 1);
        assert_eq!(assembly.dropped[0].path, "python/loops/while.md");

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn name_limit_is_inclusive() {
        let root = temp_dir();
        let at_limit = "a".repeat(100);
        let over_limit = "b".repeat(101);
        write(&root, "python/ok.md", &format!("```ngMeta\nname: {at_limit}\n```\n"));
        write(&root, "python/long.md", &format!("```ngMeta\nname: {over_limit}\n```\n"));

        let refs = [ExerciseFileRef::leaf("ok.md"), ExerciseFileRef::leaf("long.md")];
        let assembly = assembler(&root).assemble("python", &refs, None).await;

        assert_eq!(assembly.entries.len(), 1);
        assert_eq!(assembly.entries[0].exercises()[0].name, at_limit);
        assert_eq!(assembly.dropped[0].path, "python/long.md");
        assert!(assembly.dropped[0].reason.contains("101"));

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn child_names_are_limited_too() {
        let root = temp_dir();
        let long = "c".repeat(101);
        write(&root, "python/loops/long.md", &format!("```ngMeta\nname: {long}\n```\n"));

        let refs = [ExerciseFileRef::group("loops", vec!["long.md".into()])];
        let assembly = assembler(&root).assemble("python", &refs, None).await;

        assert!(assembly.entries[0].exercises().is_empty());
        assert_eq!(assembly.dropped.len(), 1);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn malformed_faq_drops_only_that_exercise() {
        let root = temp_dir();
        write(&root, "python/quiz.md", "```faq\nQ?\n> A\n```\n");
        write(&root, "python/intro.md", "# Intro\n");

        let refs = [ExerciseFileRef::leaf("quiz.md"), ExerciseFileRef::leaf("intro.md")];
        let assembly = assembler(&root).assemble("python", &refs, None).await;
        assert_eq!(assembly.entries.len(), 1);
        assert_eq!(assembly.dropped[0].path, "python/quiz.md");

        let mut config = CurriculumConfig::default();
        config.faq_mode = FaqMode::Lenient;
        let lenient = ExerciseAssembler::new(AssembleOptions::new(&root, &config));
        let assembly = lenient.assemble("python", &refs, None).await;
        assert_eq!(assembly.entries.len(), 2);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn outline_order_is_kept() {
        let root = temp_dir();
        for name in ["a", "b", "c", "d"] {
            write(&root, &format!("course/{name}.md"), &format!("# {name}\n"));
        }

        let refs: Vec<_> = ["d.md", "b.md", "a.md", "c.md"]
            .into_iter()
            .map(ExerciseFileRef::leaf)
            .collect();
        let mut opts = AssembleOptions::new(&root, &CurriculumConfig::default());
        opts.concurrency = 2;
        let assembly = ExerciseAssembler::new(opts).assemble("course", &refs, None).await;

        let slugs: Vec<_> = assembly
            .entries
            .iter()
            .map(|entry| entry.exercises()[0].slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["course__d", "course__b", "course__a", "course__c"]);

        std::fs::remove_dir_all(&root).ok();
    }
}
