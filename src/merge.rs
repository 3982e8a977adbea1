use crate::{
    commit::{Commit, Files, Parent},
    error::{Error, Result},
    graph::now,
    repository::Repository,
};

/// Combines two snapshots without looking at content: every path from
/// either side is kept, and where both sides have a path the current
/// branch's version wins.
pub fn current_wins(current: &Files, target: &Files) -> Files {
    let mut merged = target.clone();
    merged.extend(current.iter().map(|(path, content)| (path.clone(), content.clone())));
    merged
}

impl Repository {
    /// Merges `branch` into the current branch with a new merge commit and
    /// moves the current branch to it. `branch` itself does not move.
    pub fn merge(&mut self, branch: &str) -> Result<Commit> {
        self.merge_at(branch, now())
    }

    /// [`Repository::merge`] with an explicit timestamp.
    pub fn merge_at(&mut self, branch: &str, timestamp: f64) -> Result<Commit> {
        let current = self.read_head()?;
        // both pointers are resolved before either is required to be non-empty
        let into_tip = self.read_branch(&current)?;
        let from_tip = self.read_branch(branch)?;
        let into_id = into_tip.ok_or_else(|| Error::EmptyBranch(current.clone()))?;
        let from_id = from_tip.ok_or_else(|| Error::EmptyBranch(branch.to_owned()))?;
        let into = self.read_commit(&into_id)?;
        let from = self.read_commit(&from_id)?;

        let files = current_wins(&into.files, &from.files);
        let commit = Commit::new(
            format!("Merge branch '{}' into '{}'", branch, current),
            timestamp,
            files,
            Some(Parent::Merge([into_id, from_id])),
        );
        self.write_commit(&commit)?;
        self.advance(&current, commit.id())?;
        log::info!("merged {} into {} as {}", branch, current, commit.id());
        Ok(commit)
    }
}

#[test]
fn test_current_wins() {
    let current = Files::from([
        (String::from("shared.txt"), String::from("ours")),
        (String::from("only-ours.txt"), String::from("a")),
    ]);
    let target = Files::from([
        (String::from("shared.txt"), String::from("theirs")),
        (String::from("only-theirs.txt"), String::from("b")),
    ]);
    let merged = current_wins(&current, &target);
    assert_eq!(
        merged,
        Files::from([
            (String::from("only-ours.txt"), String::from("a")),
            (String::from("only-theirs.txt"), String::from("b")),
            (String::from("shared.txt"), String::from("ours")),
        ])
    );
}

#[test]
fn test_merge_scenario() {
    let tempdir = tempfile::tempdir().unwrap();
    let write = |path: &str, content: &str| {
        std::fs::write(tempdir.path().join(path), content).unwrap();
    };
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();
    write("a.txt", "hi");
    repo.stage("a.txt").unwrap();
    let main_commit = repo.commit("first").unwrap().commit;

    repo.create_branch("feature").unwrap();
    repo.checkout("feature").unwrap();
    write("a.txt", "feature change");
    write("new.txt", "from feature");
    repo.stage("a.txt").unwrap();
    repo.stage("new.txt").unwrap();
    let feature_commit = repo.commit("feature work").unwrap().commit;

    repo.checkout("main").unwrap();
    let merged = repo.merge("feature").unwrap();

    assert_eq!(merged.files["a.txt"], "hi");
    assert_eq!(merged.files["new.txt"], "from feature");
    assert_eq!(
        merged.parent,
        Some(Parent::Merge([
            main_commit.id().clone(),
            feature_commit.id().clone()
        ]))
    );
    assert_eq!(merged.message, "Merge branch 'feature' into 'main'");
    assert_eq!(repo.read_commit(merged.id()).unwrap(), merged);
    assert_eq!(repo.read_branch("main").unwrap().as_ref(), Some(merged.id()));
    assert_eq!(
        repo.read_branch("feature").unwrap().as_ref(),
        Some(feature_commit.id())
    );

    // the merged-in side is hidden from first-parent history
    let messages: Vec<String> = repo
        .history()
        .unwrap()
        .map(|commit| commit.unwrap().message)
        .collect();
    assert_eq!(messages, [merged.message.as_str(), "first"]);
}

#[test]
fn test_merge_failures_leave_no_trace() {
    let tempdir = tempfile::tempdir().unwrap();
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();
    repo.create_branch("empty").unwrap();

    // a missing target is reported even while the current branch is empty
    assert!(matches!(
        repo.merge("nope"),
        Err(Error::BranchNotFound(name)) if name == "nope"
    ));
    assert!(matches!(
        repo.merge("empty"),
        Err(Error::EmptyBranch(name)) if name == "main"
    ));
    assert_eq!(
        std::fs::read_dir(repo.root().join("commits")).unwrap().count(),
        0
    );

    std::fs::write(tempdir.path().join("a.txt"), "hi").unwrap();
    repo.stage("a.txt").unwrap();
    let first = repo.commit("first").unwrap().commit;

    assert!(matches!(
        repo.merge("nope"),
        Err(Error::BranchNotFound(name)) if name == "nope"
    ));
    assert!(matches!(
        repo.merge("empty"),
        Err(Error::EmptyBranch(name)) if name == "empty"
    ));
    assert_eq!(repo.read_branch("main").unwrap().as_ref(), Some(first.id()));
    assert_eq!(repo.history().unwrap().count(), 1);
}
