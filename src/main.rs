use loadplan::entry;
use loadplan::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
