use wavebench::error::AppResult;

fn main() -> AppResult<()> {
    wavebench::entry::run()
}
