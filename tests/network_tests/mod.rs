mod rate_fetch_test;
