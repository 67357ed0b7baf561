mod entry;
mod system;

use loadgen::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
