//! Reads many POD files in parallel.

use {
    super::Model,
    anyhow::Context,
    glob::glob,
    log::info,
    std::path::PathBuf,
    tokio::runtime::Runtime,
};

/// Reads every file matching the given glob pattern, each on its own blocking task.
///
/// Results are returned in the order the glob yields paths. The first file which fails to read
/// fails the whole batch.
pub fn read_glob(pattern: &str) -> anyhow::Result<Vec<(PathBuf, Model)>> {
    let rt = Runtime::new()?;
    let mut tasks = vec![];

    for path in glob(pattern).context("Unable to glob pattern")? {
        let path = path.context("Unable to get POD path")?;

        info!("processing {}", path.display());

        tasks.push(rt.spawn_blocking(move || {
            let model = Model::open(&path)
                .with_context(|| format!("Unable to read {}", path.display()))?;

            anyhow::Ok((path, model))
        }));
    }

    rt.block_on(async move {
        let mut res = Vec::with_capacity(tasks.len());

        for task in tasks {
            res.push(task.await.context("Unable to join read task")??);
        }

        Ok(res)
    })
}
